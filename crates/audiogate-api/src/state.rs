//! Application state shared by all handlers.

use audiogate_core::Config;
use audiogate_services::UploadOrchestrator;
use sqlx::PgPool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<UploadOrchestrator>,
    /// Kept for the health check; all intent access goes through the
    /// orchestrator's store.
    pub db_pool: Option<PgPool>,
}
