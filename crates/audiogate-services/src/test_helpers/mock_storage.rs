//! Mock Storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use audiogate_storage::{ObjectMetadata, Storage, StorageError, StorageResult};

/// Object store that keeps object metadata in memory and counts reads, so
/// tests can assert that idempotent retries skip re-verification.
#[derive(Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<String, ObjectMetadata>>>,
    read_calls: AtomicUsize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object as present with the given metadata.
    pub fn set_object(&self, key: &str, content_type: &str, size_bytes: i64) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            ObjectMetadata {
                content_type: Some(content_type.to_string()),
                size_bytes,
            },
        );
    }

    pub fn remove_object(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    /// Number of `exists`/`head_metadata` calls made so far.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn presigned_put_url(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "https://storage.example.test/{}?contentType={}&expires={}",
            object_key,
            content_type,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, object_key: &str) -> StorageResult<bool> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.lock().unwrap().contains_key(object_key))
    }

    async fn head_metadata(&self, object_key: &str) -> StorageResult<ObjectMetadata> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .get(object_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(object_key.to_string()))
    }
}
