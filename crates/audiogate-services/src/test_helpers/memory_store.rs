//! In-memory intent store for testing

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use audiogate_core::{UploadIntent, UploadStatus};
use audiogate_db::{ConditionalUpdate, UploadIntentChanges, UploadIntentStore};

/// Intent store that keeps records in a mutex-guarded map. Conditional
/// updates are atomic because the whole operation runs under the lock.
#[derive(Default)]
pub struct MemoryIntentStore {
    records: Arc<Mutex<HashMap<Uuid, UploadIntent>>>,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a record directly (for arranging test states).
    pub fn put(&self, intent: UploadIntent) {
        self.records.lock().unwrap().insert(intent.id, intent);
    }

    /// Read a record directly (for test assertions).
    pub fn snapshot(&self, id: Uuid) -> Option<UploadIntent> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    fn apply(intent: &mut UploadIntent, changes: &UploadIntentChanges) {
        if let Some(status) = changes.status {
            intent.status = status;
        }
        if let Some(size) = changes.file_size_bytes {
            intent.file_size_bytes = Some(size);
        }
        if let Some(ref message_id) = changes.processing_message_id {
            intent.processing_message_id = Some(message_id.clone());
        }
        if let Some(ref detail) = changes.error_detail {
            intent.error_detail = Some(detail.clone());
        }
        intent.updated_at = Utc::now();
    }
}

#[async_trait]
impl UploadIntentStore for MemoryIntentStore {
    async fn create(&self, intent: &UploadIntent) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(intent.id, intent.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<UploadIntent>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UploadIntentChanges,
    ) -> Result<Option<UploadIntent>> {
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(&id).map(|intent| {
            Self::apply(intent, &changes);
            intent.clone()
        }))
    }

    async fn update_if_status(
        &self,
        id: Uuid,
        expected: UploadStatus,
        changes: UploadIntentChanges,
    ) -> Result<Option<ConditionalUpdate>> {
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(&id).map(|intent| {
            if intent.status == expected {
                Self::apply(intent, &changes);
                ConditionalUpdate::Updated(intent.clone())
            } else {
                ConditionalUpdate::Stale(intent.clone())
            }
        }))
    }
}
