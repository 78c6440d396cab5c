//! Worker pool error types.

use thiserror::Error;

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Debug, Error)]
pub enum PoolError {
    /// Not a single engine could be constructed. There is no capacity to
    /// serve tasks, so this is fatal for the process that asked for a pool.
    #[error("no workers could be started")]
    NoWorkers,
}
