//! In-process task queue and dispatch for the LipRead backend.
//!
//! This crate provides:
//! - [`Task`]: one unit of transcription work with a single-use result sink
//! - [`TaskQueue`]: the FIFO shared by all producers and workers
//! - [`Dispatcher`]: submit-and-wait with a timeout
//! - Shutdown sentinels and drain accounting for graceful stop

pub mod dispatch;
pub mod error;
pub mod queue;
pub mod task;

pub use dispatch::{Dispatcher, DEFAULT_DISPATCH_TIMEOUT};
pub use error::{QueueError, QueueResult};
pub use queue::TaskQueue;
pub use task::{QueueItem, Task};
