//! Error taxonomy for the upload-intent lifecycle.
//!
//! Every backend failure is mapped to one of these kinds at the orchestrator
//! boundary; no raw storage, queue, or database error crosses into the API
//! contract. Each variant self-describes its HTTP presentation so the API
//! layer stays a thin mapping.

use crate::models::UploadIntent;

/// Log level an error should be reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors such as validation failures
    Debug,
    /// Recoverable conditions worth noticing
    Warn,
    /// Unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload intent not found: {0}")]
    NotFound(uuid::Uuid),

    /// Verification conflict: the uploaded object is missing or does not
    /// match the intent. The record may or may not have been failed; callers
    /// should consult `GetIntent`.
    #[error("{0}")]
    Conflict(String),

    /// The intent already reached `failed`; the current record is returned
    /// so the caller sees why.
    #[error("Upload intent already failed")]
    AlreadyFailed(Box<UploadIntent>),

    /// The object was verified and recorded but the processing message could
    /// not be published. Durable state is `uploaded`; the same completion
    /// call is safe to retry.
    #[error("Queue publish failed: {0}")]
    QueueUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UploadError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            UploadError::InvalidInput(_) => 400,
            UploadError::NotFound(_) => 404,
            UploadError::Conflict(_) | UploadError::AlreadyFailed(_) => 409,
            UploadError::QueueUnavailable(_) => 503,
            UploadError::Internal(_) => 500,
        }
    }

    /// Machine-readable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::InvalidInput(_) => "INVALID_INPUT",
            UploadError::NotFound(_) => "NOT_FOUND",
            UploadError::Conflict(_) => "UPLOAD_CONFLICT",
            UploadError::AlreadyFailed(_) => "UPLOAD_FAILED",
            UploadError::QueueUnavailable(_) => "QUEUE_UNAVAILABLE",
            UploadError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same call can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            UploadError::QueueUnavailable(_) | UploadError::Internal(_)
        )
    }

    /// Suggested action for the client.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            UploadError::QueueUnavailable(_) => {
                Some("Upload is stored; retry the complete call to queue processing")
            }
            UploadError::Internal(_) => Some("Retry with backoff"),
            _ => None,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            UploadError::InvalidInput(_) | UploadError::NotFound(_) => LogLevel::Debug,
            UploadError::Conflict(_)
            | UploadError::AlreadyFailed(_)
            | UploadError::QueueUnavailable(_) => LogLevel::Warn,
            UploadError::Internal(_) => LogLevel::Error,
        }
    }

    /// Wrap an unexpected backend failure.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        UploadError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            UploadError::InvalidInput("x".into()).http_status_code(),
            400
        );
        assert_eq!(UploadError::NotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(UploadError::Conflict("x".into()).http_status_code(), 409);
        assert_eq!(
            UploadError::QueueUnavailable("x".into()).http_status_code(),
            503
        );
        assert_eq!(UploadError::Internal("x".into()).http_status_code(), 500);
    }

    #[test]
    fn test_only_transient_errors_are_recoverable() {
        assert!(UploadError::QueueUnavailable("x".into()).is_recoverable());
        assert!(UploadError::Internal("x".into()).is_recoverable());
        assert!(!UploadError::Conflict("x".into()).is_recoverable());
        assert!(!UploadError::NotFound(Uuid::nil()).is_recoverable());
    }

    #[test]
    fn test_already_failed_carries_the_record() {
        let intent = UploadIntent::new(
            Uuid::new_v4(),
            "bucket".into(),
            "uploads/x/a.mp3".into(),
            "audio/mpeg".into(),
            "a.mp3".into(),
            Utc::now(),
        );
        let err = UploadError::AlreadyFailed(Box::new(intent.clone()));
        assert_eq!(err.http_status_code(), 409);
        match err {
            UploadError::AlreadyFailed(boxed) => assert_eq!(boxed.id, intent.id),
            other => panic!("expected AlreadyFailed, got {:?}", other),
        }
    }
}
