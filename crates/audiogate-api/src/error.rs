//! HTTP error response conversion
//!
//! Maps the domain error taxonomy onto HTTP responses. A completion against
//! an already-failed intent returns the intent record itself (the caller
//! needs the stored `error_detail`); every other error maps to a structured
//! error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use audiogate_core::{LogLevel, UploadError, UploadIntentResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for UploadError to implement IntoResponse
/// (orphan rules: IntoResponse is external, UploadError lives in core).
#[derive(Debug)]
pub struct HttpUploadError(pub UploadError);

impl From<UploadError> for HttpUploadError {
    fn from(err: UploadError) -> Self {
        HttpUploadError(err)
    }
}

fn log_error(error: &UploadError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = code, "Request failed");
        }
    }
}

impl IntoResponse for HttpUploadError {
    fn into_response(self) -> Response {
        let error = self.0;
        log_error(&error);

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let UploadError::AlreadyFailed(intent) = error {
            return (status, Json(UploadIntentResponse::from(*intent))).into_response();
        }

        let body = ErrorResponse {
            error: error.to_string(),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiogate_core::UploadIntent;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_validation_maps_to_400() {
        let HttpUploadError(err) = UploadError::InvalidInput("bad".to_string()).into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_publish_failure_maps_to_503_with_action() {
        let HttpUploadError(err) = UploadError::QueueUnavailable("down".to_string()).into();
        assert_eq!(err.http_status_code(), 503);
        assert!(err.is_recoverable());
        assert!(err.suggested_action().unwrap().contains("retry"));
    }

    #[test]
    fn test_already_failed_serializes_the_record() {
        let intent = UploadIntent::new(
            Uuid::new_v4(),
            "bucket".to_string(),
            "uploads/x/a.mp3".to_string(),
            "audio/mpeg".to_string(),
            "a.mp3".to_string(),
            Utc::now(),
        );
        let response =
            HttpUploadError(UploadError::AlreadyFailed(Box::new(intent))).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
