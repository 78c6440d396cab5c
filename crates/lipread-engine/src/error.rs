//! Engine error types.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("engine startup failed: {0}")]
    Startup(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid model server response: {0}")]
    InvalidResponse(String),
}

impl EngineError {
    /// Create an inference failure error.
    pub fn inference_failed(msg: impl Into<String>) -> Self {
        Self::InferenceFailed(msg.into())
    }

    /// Create a startup failure error.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Check if the error is worth retrying (transient transport faults).
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
