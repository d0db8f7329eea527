//! End-to-end lifecycle tests for the upload orchestrator, run against
//! in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use audiogate_core::{UploadError, UploadStatus};
use audiogate_services::test_helpers::{MemoryIntentStore, MockPublisher, MockStorage};
use audiogate_services::{OrchestratorConfig, UploadOrchestrator};

struct Harness {
    store: Arc<MemoryIntentStore>,
    storage: Arc<MockStorage>,
    publisher: Arc<MockPublisher>,
    orchestrator: UploadOrchestrator,
}

fn setup() -> Harness {
    let store = Arc::new(MemoryIntentStore::new());
    let storage = Arc::new(MockStorage::new());
    let publisher = Arc::new(MockPublisher::new());
    let orchestrator = UploadOrchestrator::new(
        store.clone(),
        storage.clone(),
        publisher.clone(),
        OrchestratorConfig {
            bucket: "audiogate-test".to_string(),
            upload_url_ttl: Duration::from_secs(900),
            call_timeout: Duration::from_secs(5),
        },
    );
    Harness {
        store,
        storage,
        publisher,
        orchestrator,
    }
}

#[tokio::test]
async fn test_create_intent_reserves_slot_and_credential() {
    let h = setup();

    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();

    assert_eq!(created.intent.status, UploadStatus::IntentCreated);
    assert_eq!(created.intent.bucket, "audiogate-test");
    assert_eq!(
        created.intent.object_key,
        format!("uploads/{}/song.mp3", created.intent.id)
    );
    assert!(created.upload_url.contains(&created.intent.object_key));

    // Round-trip: the stored record matches what was returned.
    let fetched = h.orchestrator.get_intent(created.intent.id).await.unwrap();
    assert_eq!(fetched.status, UploadStatus::IntentCreated);
    assert_eq!(fetched.content_type, "audio/mpeg");
    assert_eq!(fetched.file_name, "song.mp3");
    assert!(fetched.file_size_bytes.is_none());
}

#[tokio::test]
async fn test_create_intent_sanitizes_file_name_into_object_key() {
    let h = setup();

    let created = h
        .orchestrator
        .create_intent("../secret/take 1.mp3", "AUDIO/MPEG")
        .await
        .unwrap();

    assert_eq!(created.intent.file_name, ".._secret_take_1.mp3");
    assert_eq!(
        created.intent.object_key,
        format!("uploads/{}/.._secret_take_1.mp3", created.intent.id)
    );
    assert_eq!(created.intent.content_type, "audio/mpeg");
}

#[tokio::test]
async fn test_create_intent_rejects_disallowed_content_type() {
    let h = setup();

    let err = h
        .orchestrator
        .create_intent("movie.mp4", "video/mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::InvalidInput(_)));

    let err = h.orchestrator.create_intent("  ", "audio/mpeg").await.unwrap_err();
    assert!(matches!(err, UploadError::InvalidInput(_)));
}

#[tokio::test]
async fn test_complete_happy_path_queues_processing() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 4096);

    let completed = h
        .orchestrator
        .complete_intent(created.intent.id, Some(4096))
        .await
        .unwrap();

    assert_eq!(completed.status, UploadStatus::ProcessingQueued);
    assert_eq!(completed.file_size_bytes, Some(4096));
    assert!(completed.processing_message_id.is_some());

    let messages = h.publisher.published();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].upload_id, created.intent.id);
    assert_eq!(messages[0].bucket, "audiogate-test");
    assert_eq!(messages[0].object_key, created.intent.object_key);
    assert_eq!(messages[0].content_type, "audio/mpeg");
}

#[tokio::test]
async fn test_complete_before_object_exists_is_retryable() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();

    let err = h
        .orchestrator
        .complete_intent(created.intent.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Conflict(_)));

    // The record was not failed; a later completion can still succeed.
    let current = h.orchestrator.get_intent(created.intent.id).await.unwrap();
    assert_eq!(current.status, UploadStatus::IntentCreated);
    assert!(current.error_detail.is_none());
    assert!(current.file_size_bytes.is_none());

    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 1024);
    let completed = h
        .orchestrator
        .complete_intent(created.intent.id, None)
        .await
        .unwrap();
    assert_eq!(completed.status, UploadStatus::ProcessingQueued);
    assert_eq!(completed.file_size_bytes, Some(1024));
}

#[tokio::test]
async fn test_complete_content_type_mismatch_fails_intent() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "video/mp4", 4096);

    let err = h
        .orchestrator
        .complete_intent(created.intent.id, None)
        .await
        .unwrap_err();
    match err {
        UploadError::Conflict(reason) => assert!(reason.contains("content type")),
        other => panic!("expected Conflict, got {:?}", other),
    }

    // The failure is durable and observable without touching storage again.
    let reads_after_failure = h.storage.read_calls();
    let current = h.orchestrator.get_intent(created.intent.id).await.unwrap();
    assert_eq!(current.status, UploadStatus::Failed);
    assert!(current.error_detail.as_deref().unwrap().contains("content type"));
    assert!(current.file_size_bytes.is_none());
    assert_eq!(h.storage.read_calls(), reads_after_failure);

    // Re-invoking completion reports the conflict without re-verifying.
    let err = h
        .orchestrator
        .complete_intent(created.intent.id, None)
        .await
        .unwrap_err();
    match err {
        UploadError::AlreadyFailed(record) => assert_eq!(record.status, UploadStatus::Failed),
        other => panic!("expected AlreadyFailed, got {:?}", other),
    }
    assert_eq!(h.storage.read_calls(), reads_after_failure);
    assert_eq!(h.publisher.publish_count(), 0);
}

#[tokio::test]
async fn test_complete_size_mismatch_fails_intent() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 4096);

    let err = h
        .orchestrator
        .complete_intent(created.intent.id, Some(1000))
        .await
        .unwrap_err();
    match err {
        UploadError::Conflict(reason) => assert!(reason.contains("size")),
        other => panic!("expected Conflict, got {:?}", other),
    }

    let current = h.orchestrator.get_intent(created.intent.id).await.unwrap();
    assert_eq!(current.status, UploadStatus::Failed);
    assert_eq!(h.publisher.publish_count(), 0);
}

#[tokio::test]
async fn test_declared_size_fills_in_when_store_reports_zero() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 0);

    let completed = h
        .orchestrator
        .complete_intent(created.intent.id, Some(2048))
        .await
        .unwrap();
    assert_eq!(completed.status, UploadStatus::ProcessingQueued);
    assert_eq!(completed.file_size_bytes, Some(2048));
}

#[tokio::test]
async fn test_complete_is_idempotent_after_success() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 4096);

    let first = h
        .orchestrator
        .complete_intent(created.intent.id, Some(4096))
        .await
        .unwrap();
    let reads_after_first = h.storage.read_calls();

    let second = h
        .orchestrator
        .complete_intent(created.intent.id, Some(4096))
        .await
        .unwrap();

    assert_eq!(second.status, UploadStatus::ProcessingQueued);
    assert_eq!(second.processing_message_id, first.processing_message_id);
    assert_eq!(second.file_size_bytes, first.file_size_bytes);
    // No second publish and no further object-store reads.
    assert_eq!(h.publisher.publish_count(), 1);
    assert_eq!(h.storage.read_calls(), reads_after_first);
}

#[tokio::test]
async fn test_publish_failure_leaves_uploaded_and_retry_publishes_only() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 4096);
    h.publisher.set_failing(true);

    let err = h
        .orchestrator
        .complete_intent(created.intent.id, Some(4096))
        .await
        .unwrap_err();
    match &err {
        UploadError::QueueUnavailable(_) => assert!(err.is_recoverable()),
        other => panic!("expected QueueUnavailable, got {:?}", other),
    }

    // Verification already happened and was recorded durably.
    let current = h.orchestrator.get_intent(created.intent.id).await.unwrap();
    assert_eq!(current.status, UploadStatus::Uploaded);
    assert_eq!(current.file_size_bytes, Some(4096));
    assert!(current.processing_message_id.is_none());

    // Retry once the broker is back: publish-only, no re-verification.
    h.publisher.set_failing(false);
    let reads_before_retry = h.storage.read_calls();
    let completed = h
        .orchestrator
        .complete_intent(created.intent.id, Some(4096))
        .await
        .unwrap();

    assert_eq!(completed.status, UploadStatus::ProcessingQueued);
    assert!(completed.processing_message_id.is_some());
    assert_eq!(h.storage.read_calls(), reads_before_retry);
    assert_eq!(h.publisher.publish_count(), 1);
}

#[tokio::test]
async fn test_losing_racer_takes_idempotent_branch() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();
    h.storage
        .set_object(&created.intent.object_key, "audio/mpeg", 4096);

    // Simulate a concurrent completion that already queued the intent
    // between this caller's read and its conditional update.
    let mut queued = created.intent.clone();
    queued.status = UploadStatus::ProcessingQueued;
    queued.file_size_bytes = Some(4096);
    queued.processing_message_id = Some("winner-message".to_string());
    h.store.put(queued);

    let result = h
        .orchestrator
        .complete_intent(created.intent.id, Some(4096))
        .await
        .unwrap();

    // The winner's record comes back untouched; no second publish, and the
    // recorded message id is never overwritten.
    assert_eq!(result.status, UploadStatus::ProcessingQueued);
    assert_eq!(result.processing_message_id.as_deref(), Some("winner-message"));
    assert_eq!(h.publisher.publish_count(), 0);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let h = setup();
    let id = Uuid::new_v4();

    let err = h.orchestrator.complete_intent(id, None).await.unwrap_err();
    assert!(matches!(err, UploadError::NotFound(_)));

    let err = h.orchestrator.get_intent(id).await.unwrap_err();
    assert!(matches!(err, UploadError::NotFound(_)));
}

#[tokio::test]
async fn test_get_intent_never_mutates() {
    let h = setup();
    let created = h
        .orchestrator
        .create_intent("song.mp3", "audio/mpeg")
        .await
        .unwrap();

    let before = h.store.snapshot(created.intent.id).unwrap();
    let fetched = h.orchestrator.get_intent(created.intent.id).await.unwrap();
    let after = h.store.snapshot(created.intent.id).unwrap();

    assert_eq!(fetched.status, UploadStatus::IntentCreated);
    assert_eq!(before.updated_at, after.updated_at);
    assert_eq!(h.storage.read_calls(), 0);
}
