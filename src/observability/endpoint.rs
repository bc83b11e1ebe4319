//! Exposition endpoint for counter series.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

/// Serve the current counter values as plain text, one
/// `name{label="value",...} count` line per series.
pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    let body = state.metrics.render();

    tracing::debug!(metrics_size = %body.len(), "Metrics served");

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
