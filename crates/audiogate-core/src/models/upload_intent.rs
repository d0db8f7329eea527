use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle states of an upload intent.
///
/// Forward-only: `intent_created → uploaded → processing_queued → processing
/// → completed`. `failed` is terminal and only reachable from
/// `intent_created` or `uploaded`; once an intent is queued for processing
/// the orchestrator no longer has authority to fail it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    IntentCreated,
    Uploaded,
    ProcessingQueued,
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    /// Stable string form, matching both the JSON representation and the
    /// `upload_status` Postgres enum labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::IntentCreated => "intent_created",
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::ProcessingQueued => "processing_queued",
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Failed => "failed",
        }
    }

    /// True for states the record can never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }

    /// True once the intent has been handed to the processing pipeline
    /// (queued or later). Completion calls against such intents are
    /// idempotent no-ops.
    pub fn is_queued_or_later(&self) -> bool {
        matches!(
            self,
            UploadStatus::ProcessingQueued | UploadStatus::Processing | UploadStatus::Completed
        )
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intent_created" => Ok(UploadStatus::IntentCreated),
            "uploaded" => Ok(UploadStatus::Uploaded),
            "processing_queued" => Ok(UploadStatus::ProcessingQueued),
            "processing" => Ok(UploadStatus::Processing),
            "completed" => Ok(UploadStatus::Completed),
            "failed" => Ok(UploadStatus::Failed),
            other => Err(anyhow::anyhow!("unknown upload status: {}", other)),
        }
    }
}

/// Durable record reserving an upload slot and tracking it through
/// verification and processing hand-off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadIntent {
    pub id: Uuid,
    pub status: UploadStatus,
    pub bucket: String,
    pub object_key: String,
    /// Declared at creation from the audio allow-list; fixed for the
    /// lifetime of the intent.
    pub content_type: String,
    /// Sanitized display name.
    pub file_name: String,
    /// Set at most once, on the successful completion path.
    pub file_size_bytes: Option<i64>,
    pub upload_url_expires_at: DateTime<Utc>,
    /// Broker message id, recorded when the processing message is published.
    /// Never overwritten once set.
    pub processing_message_id: Option<String>,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadIntent {
    /// Build a fresh record in `intent_created`.
    pub fn new(
        id: Uuid,
        bucket: String,
        object_key: String,
        content_type: String,
        file_name: String,
        upload_url_expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        UploadIntent {
            id,
            status: UploadStatus::IntentCreated,
            bucket,
            object_key,
            content_type,
            file_name,
            file_size_bytes: None,
            upload_url_expires_at,
            processing_message_id: None,
            error_detail: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to create an upload intent.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUploadIntentRequest {
    /// Original filename
    #[validate(length(
        min = 1,
        max = 255,
        message = "file_name must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    /// Declared content type (MIME type, must be an allowed audio type)
    #[validate(length(
        min = 1,
        max = 255,
        message = "content_type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
}

/// Response containing the write credential for a newly created intent.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUploadIntentResponse {
    /// Intent id (used to complete the upload and poll its status)
    pub upload_id: Uuid,
    pub bucket: String,
    /// Object key the presigned URL writes to
    pub object_key: String,
    pub content_type: String,
    /// Presigned PUT URL for the direct upload
    pub upload_url: String,
    /// URL expiration time
    pub upload_url_expires_at: DateTime<Utc>,
}

/// Request to complete an upload after the file has been written to storage.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CompleteUploadRequest {
    /// Size the caller believes it uploaded; checked against the object
    /// metadata when both are positive.
    #[serde(default)]
    pub file_size_bytes: Option<i64>,
}

/// Projection of an intent record returned by the complete and get
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadIntentResponse {
    pub id: Uuid,
    pub status: UploadStatus,
    pub bucket: String,
    pub object_key: String,
    pub content_type: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<i64>,
    pub upload_url_expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UploadIntent> for UploadIntentResponse {
    fn from(intent: UploadIntent) -> Self {
        UploadIntentResponse {
            id: intent.id,
            status: intent.status,
            bucket: intent.bucket,
            object_key: intent.object_key,
            content_type: intent.content_type,
            file_name: intent.file_name,
            file_size_bytes: intent.file_size_bytes,
            upload_url_expires_at: intent.upload_url_expires_at,
            processing_message_id: intent.processing_message_id,
            error_detail: intent.error_detail,
            created_at: intent.created_at,
            updated_at: intent.updated_at,
        }
    }
}
