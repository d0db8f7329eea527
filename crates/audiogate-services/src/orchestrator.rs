//! Upload-intent lifecycle orchestrator.
//!
//! Three operations: `create_intent`, `complete_intent`, `get_intent`.
//! `complete_intent` is the delicate one: it must stay safe under client
//! retries, crashes between verification and publish, and concurrent calls
//! for the same id. Status transitions out of `intent_created` and
//! `uploaded` go through conditional updates so a losing racer observes the
//! winner's state and falls into the idempotent branch instead of moving the
//! record backwards.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use audiogate_core::validation::{object_key_for, validate_new_upload};
use audiogate_core::{ProcessingMessage, UploadError, UploadIntent, UploadStatus};
use audiogate_db::{ConditionalUpdate, UploadIntentChanges, UploadIntentStore};
use audiogate_queue::QueuePublisher;
use audiogate_storage::Storage;

#[derive(Clone)]
pub struct OrchestratorConfig {
    /// Destination bucket recorded on every intent.
    pub bucket: String,
    /// Lifetime of issued presigned PUT URLs.
    pub upload_url_ttl: Duration,
    /// Deadline applied to each store/storage/queue call.
    pub call_timeout: Duration,
}

/// A freshly created intent together with its write credential.
#[derive(Debug, Clone)]
pub struct CreatedIntent {
    pub intent: UploadIntent,
    pub upload_url: String,
}

pub struct UploadOrchestrator {
    store: Arc<dyn UploadIntentStore>,
    storage: Arc<dyn Storage>,
    publisher: Arc<dyn QueuePublisher>,
    config: OrchestratorConfig,
}

impl UploadOrchestrator {
    pub fn new(
        store: Arc<dyn UploadIntentStore>,
        storage: Arc<dyn Storage>,
        publisher: Arc<dyn QueuePublisher>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            storage,
            publisher,
            config,
        }
    }

    /// Reserve an upload slot: generate an id, derive the object key, issue
    /// a content-type-pinned presigned PUT URL, and persist the record in
    /// `intent_created`.
    #[tracing::instrument(skip(self), fields(operation = "create_intent"))]
    pub async fn create_intent(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<CreatedIntent, UploadError> {
        let (file_name, content_type) = validate_new_upload(file_name, content_type)?;

        let id = Uuid::new_v4();
        let object_key = object_key_for(id, &file_name);

        let upload_url = self
            .deadline(
                "presign",
                self.storage
                    .presigned_put_url(&object_key, &content_type, self.config.upload_url_ttl),
            )
            .await?
            .map_err(|e| UploadError::Internal(format!("presign failed: {}", e)))?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.config.upload_url_ttl)
                .map_err(UploadError::internal)?;

        let intent = UploadIntent::new(
            id,
            self.config.bucket.clone(),
            object_key,
            content_type,
            file_name,
            expires_at,
        );

        self.deadline("intent create", self.store.create(&intent))
            .await?
            .map_err(|e| UploadError::Internal(format!("intent store error: {}", e)))?;

        tracing::info!(
            upload_id = %intent.id,
            object_key = %intent.object_key,
            content_type = %intent.content_type,
            "Upload intent created"
        );

        Ok(CreatedIntent { intent, upload_url })
    }

    /// Verify the uploaded object and hand it to the processing queue.
    ///
    /// Safe to call any number of times: already-queued intents return
    /// unchanged, a `failed` intent reports the conflict, and an intent left
    /// in `uploaded` by an earlier publish failure retries publish only.
    #[tracing::instrument(skip(self), fields(operation = "complete_intent", upload_id = %id))]
    pub async fn complete_intent(
        &self,
        id: Uuid,
        declared_size: Option<i64>,
    ) -> Result<UploadIntent, UploadError> {
        let intent = self.fetch(id).await?.ok_or(UploadError::NotFound(id))?;

        match intent.status {
            UploadStatus::ProcessingQueued
            | UploadStatus::Processing
            | UploadStatus::Completed => Ok(intent),
            UploadStatus::Failed => Err(UploadError::AlreadyFailed(Box::new(intent))),
            // Verification already passed; only the publish is outstanding.
            UploadStatus::Uploaded => self.publish_and_queue(intent).await,
            UploadStatus::IntentCreated => self.verify_and_advance(intent, declared_size).await,
        }
    }

    /// Pure read of the current record.
    #[tracing::instrument(skip(self), fields(operation = "get_intent", upload_id = %id))]
    pub async fn get_intent(&self, id: Uuid) -> Result<UploadIntent, UploadError> {
        self.fetch(id).await?.ok_or(UploadError::NotFound(id))
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<UploadIntent>, UploadError> {
        self.deadline("intent lookup", self.store.get(id))
            .await?
            .map_err(|e| UploadError::Internal(format!("intent store error: {}", e)))
    }

    /// Verify the object against the intent, then move
    /// `intent_created → uploaded` and publish.
    async fn verify_and_advance(
        &self,
        intent: UploadIntent,
        declared_size: Option<i64>,
    ) -> Result<UploadIntent, UploadError> {
        let exists = self
            .deadline("existence check", self.storage.exists(&intent.object_key))
            .await?
            .map_err(|e| UploadError::Internal(format!("existence check failed: {}", e)))?;

        if !exists {
            // The object may still be propagating; the record stays in
            // `intent_created` so a later completion can succeed.
            tracing::warn!(
                upload_id = %intent.id,
                object_key = %intent.object_key,
                "Completion requested but object not found in bucket"
            );
            return Err(UploadError::Conflict(
                "uploaded object not found in bucket".to_string(),
            ));
        }

        let metadata = self
            .deadline(
                "metadata read",
                self.storage.head_metadata(&intent.object_key),
            )
            .await?
            .map_err(|e| UploadError::Internal(format!("metadata read failed: {}", e)))?;

        if metadata.content_type.as_deref() != Some(intent.content_type.as_str()) {
            return self
                .fail_verification(intent, "content type mismatch for uploaded object")
                .await;
        }

        let declared = declared_size.filter(|d| *d > 0);
        if let Some(declared) = declared {
            if metadata.size_bytes > 0 && metadata.size_bytes != declared {
                return self
                    .fail_verification(intent, "uploaded object size mismatch")
                    .await;
            }
        }

        let recorded_size = if metadata.size_bytes > 0 {
            Some(metadata.size_bytes)
        } else {
            declared
        };

        let changes = UploadIntentChanges {
            status: Some(UploadStatus::Uploaded),
            file_size_bytes: recorded_size,
            ..Default::default()
        };
        let outcome = self
            .deadline(
                "intent update",
                self.store
                    .update_if_status(intent.id, UploadStatus::IntentCreated, changes),
            )
            .await?
            .map_err(|e| UploadError::Internal(format!("intent store error: {}", e)))?;

        match outcome {
            None => Err(UploadError::NotFound(intent.id)),
            Some(ConditionalUpdate::Updated(updated)) => self.publish_and_queue(updated).await,
            // A concurrent completion won the transition; act on what it
            // left behind.
            Some(ConditionalUpdate::Stale(current)) => match current.status {
                UploadStatus::ProcessingQueued
                | UploadStatus::Processing
                | UploadStatus::Completed => Ok(current),
                UploadStatus::Uploaded => self.publish_and_queue(current).await,
                UploadStatus::Failed => Err(UploadError::AlreadyFailed(Box::new(current))),
                UploadStatus::IntentCreated => Err(UploadError::Internal(
                    "conditional update reported stale without a status change".to_string(),
                )),
            },
        }
    }

    /// Record a verification failure. The transition is conditional on the
    /// record still being in `intent_created`: a record that already moved
    /// on must never be dragged back to `failed`.
    async fn fail_verification(
        &self,
        intent: UploadIntent,
        reason: &str,
    ) -> Result<UploadIntent, UploadError> {
        let changes = UploadIntentChanges {
            status: Some(UploadStatus::Failed),
            error_detail: Some(reason.to_string()),
            ..Default::default()
        };
        let outcome = self
            .deadline(
                "intent update",
                self.store
                    .update_if_status(intent.id, UploadStatus::IntentCreated, changes),
            )
            .await?
            .map_err(|e| UploadError::Internal(format!("intent store error: {}", e)))?;

        match outcome {
            None => Err(UploadError::NotFound(intent.id)),
            Some(ConditionalUpdate::Updated(_)) => {
                tracing::warn!(
                    upload_id = %intent.id,
                    object_key = %intent.object_key,
                    reason = %reason,
                    "Upload verification failed"
                );
                Err(UploadError::Conflict(reason.to_string()))
            }
            Some(ConditionalUpdate::Stale(current)) => match current.status {
                // A concurrent completion verified successfully before we
                // could fail the record; defer to its view.
                UploadStatus::Uploaded
                | UploadStatus::ProcessingQueued
                | UploadStatus::Processing
                | UploadStatus::Completed => Ok(current),
                UploadStatus::Failed => Err(UploadError::AlreadyFailed(Box::new(current))),
                UploadStatus::IntentCreated => Err(UploadError::Internal(
                    "conditional update reported stale without a status change".to_string(),
                )),
            },
        }
    }

    /// Publish the processing message and move `uploaded →
    /// processing_queued`, recording the broker message id. On publish
    /// failure the record stays `uploaded` and the caller is told to retry.
    async fn publish_and_queue(&self, intent: UploadIntent) -> Result<UploadIntent, UploadError> {
        let message = ProcessingMessage::new(
            intent.id,
            &intent.bucket,
            &intent.object_key,
            &intent.content_type,
        );

        let message_id =
            match tokio::time::timeout(self.config.call_timeout, self.publisher.publish(&message))
                .await
            {
                Err(_) => {
                    return Err(UploadError::QueueUnavailable(
                        "publish timed out".to_string(),
                    ))
                }
                Ok(Err(e)) => return Err(UploadError::QueueUnavailable(e.to_string())),
                Ok(Ok(message_id)) => message_id,
            };

        let changes = UploadIntentChanges {
            status: Some(UploadStatus::ProcessingQueued),
            processing_message_id: Some(message_id.clone()),
            ..Default::default()
        };
        let outcome = self
            .deadline(
                "intent update",
                self.store
                    .update_if_status(intent.id, UploadStatus::Uploaded, changes),
            )
            .await?
            .map_err(|e| UploadError::Internal(format!("intent store error: {}", e)))?;

        match outcome {
            None => Err(UploadError::NotFound(intent.id)),
            Some(ConditionalUpdate::Updated(updated)) => {
                tracing::info!(
                    upload_id = %updated.id,
                    message_id = %message_id,
                    "Upload queued for processing"
                );
                Ok(updated)
            }
            Some(ConditionalUpdate::Stale(current)) => match current.status {
                // A concurrent completion queued the intent first; its
                // message id stays, ours is dropped.
                UploadStatus::ProcessingQueued
                | UploadStatus::Processing
                | UploadStatus::Completed => {
                    tracing::warn!(
                        upload_id = %current.id,
                        dropped_message_id = %message_id,
                        "Concurrent completion already queued this upload"
                    );
                    Ok(current)
                }
                other => Err(UploadError::Internal(format!(
                    "unexpected status {} after publish",
                    other
                ))),
            },
        }
    }

    /// Run a collaborator call under the configured deadline. A timeout
    /// leaves no partial update: the wrapped operation either completed in
    /// the backend or never happened from the record's point of view.
    async fn deadline<F, T, E>(&self, op: &str, fut: F) -> Result<Result<T, E>, UploadError>
    where
        F: Future<Output = Result<T, E>>,
    {
        tokio::time::timeout(self.config.call_timeout, fut)
            .await
            .map_err(|_| UploadError::Internal(format!("{} timed out", op)))
    }
}
