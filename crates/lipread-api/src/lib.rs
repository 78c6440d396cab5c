//! Axum HTTP API server for the LipRead backend.
//!
//! This crate provides:
//! - Upload → dispatch → transcription response (`POST /process`)
//! - Health/readiness probes and queue status
//! - Prometheus metrics endpoint
//! - CORS, request-id and request-logging middleware

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
