//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use audiogate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Audiogate API",
        version = "0.1.0",
        description = "Direct-to-storage audio upload API. Clients create an upload intent, PUT the file to the returned presigned URL, then complete the intent to queue asynchronous processing. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::upload_intents::create_upload_intent,
        handlers::upload_intents::complete_upload,
        handlers::upload_intents::get_upload,
    ),
    components(schemas(
        models::upload_intent::CreateUploadIntentRequest,
        models::upload_intent::CreateUploadIntentResponse,
        models::upload_intent::CompleteUploadRequest,
        models::upload_intent::UploadIntentResponse,
        models::upload_intent::UploadStatus,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload intent lifecycle")
    )
)]
pub struct ApiDoc;
