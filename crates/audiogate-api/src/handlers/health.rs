use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    database: String,
}

/// Liveness/readiness probe. Pings the database when a pool is attached.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = HealthCheckResponse {
        status: "healthy".to_string(),
        database: "not_configured".to_string(),
    };
    let mut healthy = true;

    if let Some(ref pool) = state.db_pool {
        match tokio::time::timeout(TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
            Ok(Ok(_)) => response.database = "healthy".to_string(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Health check: database query failed");
                response.database = "unhealthy".to_string();
                healthy = false;
            }
            Err(_) => {
                tracing::warn!("Health check: database query timed out");
                response.database = "timeout".to_string();
                healthy = false;
            }
        }
    }

    if !healthy {
        response.status = "unhealthy".to_string();
        return (StatusCode::SERVICE_UNAVAILABLE, Json(response));
    }

    (StatusCode::OK, Json(response))
}
