//! Storage abstraction trait
//!
//! Defines the narrow object-store contract the upload lifecycle needs:
//! presigned write-URL issuance, existence check, and metadata read.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Metadata reported by the object store for an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Content type the store recorded at write time, if any.
    pub content_type: Option<String>,
    /// Object size in bytes; 0 when the store does not report one.
    pub size_bytes: i64,
}

/// Storage abstraction trait
///
/// All object-store backends must implement this. Keys follow the
/// `uploads/{intent_id}/{filename}` layout produced at intent creation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a presigned PUT URL for a direct upload.
    ///
    /// The URL is pinned to `content_type`: the upload must carry the same
    /// `Content-Type` header or the store rejects it.
    async fn presigned_put_url(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, object_key: &str) -> StorageResult<bool>;

    /// Read content type and size for an object.
    /// Returns `StorageError::NotFound` when the object is absent.
    async fn head_metadata(&self, object_key: &str) -> StorageResult<ObjectMetadata>;
}
