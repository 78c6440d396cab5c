//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{health, process_media, queue_status, ready, render_metrics};
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/process", post(process_media))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let ops_routes = Router::new()
        .route("/status", get(queue_status))
        .route("/metrics", get(render_metrics));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(ops_routes)
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
