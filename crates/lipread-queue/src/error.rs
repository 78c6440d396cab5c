//! Queue error types.

use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    /// Enqueue attempted after shutdown was initiated. Submissions are
    /// rejected loudly rather than silently dropped or left hanging.
    #[error("queue is shut down; task rejected")]
    Shutdown,

    /// All workers exited and the channel is gone. Only reachable if a
    /// producer outlives the pool.
    #[error("queue is closed; no workers remain")]
    Closed,
}
