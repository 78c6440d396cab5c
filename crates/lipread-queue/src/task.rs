//! Task types for the queue.

use std::path::PathBuf;

use tokio::sync::oneshot;

use lipread_models::{Outcome, TaskId};

/// One unit of dispatchable transcription work.
///
/// A task is enqueued by exactly one producer and claimed by exactly one
/// worker. `result` is a single-use, capacity-one sink: the claiming worker
/// writes at most one [`Outcome`] into it, and the producer's paired
/// receiver reads at most once. Dropping the receiver (a caller that gave
/// up) is harmless; the worker's late send fails and the value is
/// discarded.
#[derive(Debug)]
pub struct Task {
    /// Unique task ID (request correlation key).
    pub id: TaskId,
    /// Primary input artifact. Must exist when a worker claims the task;
    /// the worker deletes it after processing, success or failure.
    pub media_path: PathBuf,
    /// Optional precomputed landmarks file. `None` means the engine
    /// computes landmarks itself. Caller-owned; never deleted by the pool.
    pub aux_path: Option<PathBuf>,
    /// Single-use result sink written by the claiming worker.
    pub result: oneshot::Sender<Outcome>,
}

impl Task {
    /// Build a task together with the receiving half of its result sink.
    pub fn new(
        media_path: impl Into<PathBuf>,
        aux_path: Option<PathBuf>,
    ) -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let task = Self {
            id: TaskId::new(),
            media_path: media_path.into(),
            aux_path,
            result: tx,
        };
        (task, rx)
    }
}

/// Item carried by the queue channel.
///
/// Shutdown is a dedicated variant rather than a null-shaped task so a
/// worker can never mistake the stop signal for work.
#[derive(Debug)]
pub enum QueueItem {
    /// A real task to process.
    Task(Task),
    /// Stop claiming and exit the worker loop. One sentinel is sent per
    /// live worker; each worker consumes exactly one.
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn result_sink_delivers_exactly_once() {
        let (task, rx) = Task::new("/tmp/clip.mp4", None);
        task.result.send(Outcome::success("hi")).unwrap();
        assert_eq!(rx.await.unwrap(), Outcome::success("hi"));
    }

    #[tokio::test]
    async fn late_send_to_abandoned_sink_is_discarded() {
        let (task, rx) = Task::new("/tmp/clip.mp4", None);
        drop(rx);
        assert!(task.result.send(Outcome::success("late")).is_err());
    }
}
