//! Capture error types.

use thiserror::Error;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device failed to produce a frame this many times in a row.
    /// Transient misses are tolerated; a dead device ends the session.
    #[error("capture failed {0} consecutive times; stopping session")]
    TooManyFailures(usize),

    #[error(transparent)]
    Media(#[from] lipread_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
