//! Application setup and initialization
//!
//! All bootstrap logic lives here so `main` stays a thin shell and tests can
//! assemble the router with substitute collaborators.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use audiogate_core::Config;
use audiogate_db::PgUploadIntentStore;
use audiogate_queue::SqsPublisher;
use audiogate_services::{OrchestratorConfig, UploadOrchestrator};
use audiogate_storage::S3Storage;
use std::sync::Arc;

/// Initialize the entire application: telemetry, database, backends,
/// orchestrator, and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %config.environment,
        bucket = %config.s3_bucket,
        region = %config.region(),
        "Configuration loaded"
    );

    let pool = database::setup_database(&config).await?;

    let storage = S3Storage::new(
        config.s3_bucket.clone(),
        config.region().to_string(),
        config.s3_endpoint.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize S3 storage: {}", e))?;

    let publisher = SqsPublisher::new(config.sqs_queue_url.clone(), config.region().to_string())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize SQS publisher: {}", e))?;

    let orchestrator = UploadOrchestrator::new(
        Arc::new(PgUploadIntentStore::new(pool.clone())),
        Arc::new(storage),
        Arc::new(publisher),
        OrchestratorConfig {
            bucket: config.s3_bucket.clone(),
            upload_url_ttl: config.upload_url_ttl(),
            call_timeout: config.collaborator_timeout(),
        },
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        orchestrator: Arc::new(orchestrator),
        db_pool: Some(pool),
    });

    let router = routes::build_router(&config, state.clone())?;

    Ok((state, router))
}
