//! Worker pool for the LipRead backend.
//!
//! This crate provides:
//! - Pool startup against a shared queue (one engine per worker)
//! - The worker claim loop with per-task failure containment
//! - Graceful drain-and-stop shutdown

pub mod config;
pub mod error;
pub mod pool;

pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use pool::WorkerPool;
