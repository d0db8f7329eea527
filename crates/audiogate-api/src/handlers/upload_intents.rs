use crate::error::{ErrorResponse, HttpUploadError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use audiogate_core::{
    CompleteUploadRequest, CreateUploadIntentRequest, CreateUploadIntentResponse, UploadError,
    UploadIntentResponse,
};

/// Create an upload intent and return a presigned PUT URL for the direct
/// upload.
#[utoipa::path(
    post,
    path = "/api/v0/uploads/intents",
    tag = "uploads",
    request_body = CreateUploadIntentRequest,
    responses(
        (status = 201, description = "Upload intent created", body = CreateUploadIntentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(operation = "create_upload_intent")
)]
pub async fn create_upload_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUploadIntentRequest>,
) -> Result<impl IntoResponse, HttpUploadError> {
    request
        .validate()
        .map_err(|e| UploadError::InvalidInput(e.to_string()))?;

    let created = state
        .orchestrator
        .create_intent(&request.file_name, &request.content_type)
        .await?;

    let response = CreateUploadIntentResponse {
        upload_id: created.intent.id,
        bucket: created.intent.bucket,
        object_key: created.intent.object_key,
        content_type: created.intent.content_type,
        upload_url: created.upload_url,
        upload_url_expires_at: created.intent.upload_url_expires_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Complete an upload after the file has been written to storage: verify
/// the object and queue it for processing. Idempotent; safe to retry.
#[utoipa::path(
    post,
    path = "/api/v0/uploads/{upload_id}/complete",
    tag = "uploads",
    params(("upload_id" = Uuid, Path, description = "Upload intent id")),
    request_body = CompleteUploadRequest,
    responses(
        (status = 200, description = "Upload verified and queued (or already queued)", body = UploadIntentResponse),
        (status = 404, description = "Upload intent not found", body = ErrorResponse),
        (status = 409, description = "Verification conflict or intent already failed"),
        (status = 503, description = "Upload stored but queueing failed; retry", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(operation = "complete_upload", upload_id = %upload_id)
)]
pub async fn complete_upload(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<Uuid>,
    Json(request): Json<CompleteUploadRequest>,
) -> Result<Json<UploadIntentResponse>, HttpUploadError> {
    let intent = state
        .orchestrator
        .complete_intent(upload_id, request.file_size_bytes)
        .await?;

    Ok(Json(UploadIntentResponse::from(intent)))
}

/// Read the current state of an upload intent. Pure projection; callers
/// poll this to observe the downstream worker's progress.
#[utoipa::path(
    get,
    path = "/api/v0/uploads/{upload_id}",
    tag = "uploads",
    params(("upload_id" = Uuid, Path, description = "Upload intent id")),
    responses(
        (status = 200, description = "Current intent record", body = UploadIntentResponse),
        (status = 404, description = "Upload intent not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_upload", upload_id = %upload_id))]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<Uuid>,
) -> Result<Json<UploadIntentResponse>, HttpUploadError> {
    let intent = state.orchestrator.get_intent(upload_id).await?;
    Ok(Json(UploadIntentResponse::from(intent)))
}
