//! Pool status and metrics handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Queue status response.
#[derive(Serialize)]
pub struct StatusResponse {
    /// Tasks submitted but not yet finished (pending plus in-flight)
    pub queue_depth: usize,
    /// Live workers in the pool
    pub workers: usize,
    /// Whether new submissions are still accepted
    pub accepting: bool,
}

/// Get queue status.
pub async fn queue_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        queue_depth: state.queue.len(),
        workers: state.live_workers,
        accepting: !state.queue.is_shut_down(),
    })
}

/// Render Prometheus metrics.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
