use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use super::state::{HealthResponse, HealthStatus};
use crate::server::AppState;

/// Liveness probe at /health - the process is alive.
pub async fn liveness_handler() -> &'static str {
    "OK"
}

/// Readiness probe at /health/ready - the server is bound and ready to
/// serve traffic.
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let health = state.health.get_health().await;
    match health.status {
        HealthStatus::Healthy => Ok(Json(health)),
        HealthStatus::Starting => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
