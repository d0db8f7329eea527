//! Intent-store trait abstraction
//!
//! Defines the minimal persistence interface the orchestrator needs,
//! allowing tests to run against an in-memory double and production against
//! PostgreSQL. All operations are atomic at single-record granularity.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use audiogate_core::{UploadIntent, UploadStatus};

/// Partial update applied to an intent record. Only the supplied fields
/// change; `updated_at` is refreshed by every update.
#[derive(Debug, Clone, Default)]
pub struct UploadIntentChanges {
    pub status: Option<UploadStatus>,
    pub file_size_bytes: Option<i64>,
    pub processing_message_id: Option<String>,
    pub error_detail: Option<String>,
}

impl UploadIntentChanges {
    pub fn status(status: UploadStatus) -> Self {
        UploadIntentChanges {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Outcome of a conditional (compare-and-swap) update.
#[derive(Debug)]
pub enum ConditionalUpdate {
    /// The record matched the expected status and was updated.
    Updated(UploadIntent),
    /// The record exists but its status no longer matches; the current
    /// record is returned so the caller can re-dispatch on it.
    Stale(UploadIntent),
}

/// Trait for upload-intent persistence.
#[async_trait]
pub trait UploadIntentStore: Send + Sync {
    /// Persist a new intent record.
    async fn create(&self, intent: &UploadIntent) -> Result<()>;

    /// Point read by id.
    async fn get(&self, id: Uuid) -> Result<Option<UploadIntent>>;

    /// Merge-update: apply the supplied fields, refresh `updated_at`, and
    /// return the updated record. `None` when the id is unknown.
    async fn update(
        &self,
        id: Uuid,
        changes: UploadIntentChanges,
    ) -> Result<Option<UploadIntent>>;

    /// Conditional merge-update keyed on the expected current status. Used
    /// to guard state transitions so concurrent completions cannot move a
    /// record backwards or publish twice. `None` when the id is unknown.
    async fn update_if_status(
        &self,
        id: Uuid,
        expected: UploadStatus,
        changes: UploadIntentChanges,
    ) -> Result<Option<ConditionalUpdate>>;
}
