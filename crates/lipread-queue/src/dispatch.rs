//! Request/response bridge between producers and the worker pool.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time;
use tracing::{debug, warn};

use lipread_models::Outcome;

use crate::error::QueueResult;
use crate::queue::TaskQueue;
use crate::task::Task;

/// Default wait for a worker to deliver an outcome.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Submits tasks and waits for their outcomes under a timeout.
///
/// On timeout the dispatcher abandons only its wait: the task stays in the
/// queue, a worker may still process it, and the late outcome is discarded
/// when the worker's send hits the dropped receiver. Processing is
/// at-least-once, delivery to the original caller at-most-once. The input
/// artifact is deleted by whichever worker eventually processes the task,
/// never by the waiter, so a timed-out caller cannot race the deletion.
#[derive(Clone)]
pub struct Dispatcher {
    queue: TaskQueue,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with the default timeout.
    pub fn new(queue: TaskQueue) -> Self {
        Self::with_timeout(queue, DEFAULT_DISPATCH_TIMEOUT)
    }

    /// Create a dispatcher with a specific timeout.
    pub fn with_timeout(queue: TaskQueue, timeout: Duration) -> Self {
        Self { queue, timeout }
    }

    /// The queue this dispatcher submits to.
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Submit an artifact for transcription and wait for its outcome.
    ///
    /// Fails with [`crate::QueueError::Shutdown`] if the pool is shutting
    /// down; every other condition (including timeout) is reported as an
    /// [`Outcome`].
    pub async fn process(
        &self,
        media_path: impl Into<PathBuf>,
        aux_path: Option<PathBuf>,
    ) -> QueueResult<Outcome> {
        self.process_with_timeout(media_path, aux_path, self.timeout)
            .await
    }

    /// Same as [`Dispatcher::process`] with a per-call timeout.
    pub async fn process_with_timeout(
        &self,
        media_path: impl Into<PathBuf>,
        aux_path: Option<PathBuf>,
        timeout: Duration,
    ) -> QueueResult<Outcome> {
        let (task, outcome_rx) = Task::new(media_path, aux_path);
        let task_id = task.id.clone();

        self.queue.enqueue(task)?;
        debug!(task_id = %task_id, "task submitted, awaiting outcome");

        match time::timeout(timeout, outcome_rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            // The worker dropped the task without replying. Contained
            // failures are reported through the sink, so this only happens
            // if a worker died mid-task.
            Ok(Err(_)) => {
                warn!(task_id = %task_id, "worker abandoned task without an outcome");
                Ok(Outcome::failure("worker abandoned task"))
            }
            Err(_) => {
                warn!(
                    task_id = %task_id,
                    timeout_secs = timeout.as_secs(),
                    "processing timed out; abandoning wait"
                );
                Ok(Outcome::failure("processing timed out"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::QueueItem;

    #[tokio::test]
    async fn delivers_outcome_from_worker() {
        let queue = TaskQueue::new();
        let dispatcher = Dispatcher::new(queue.clone());

        let worker = tokio::spawn(async move {
            match queue.claim().await {
                Some(QueueItem::Task(task)) => {
                    task.result.send(Outcome::success("bonjour")).unwrap();
                    queue.task_done();
                }
                other => panic!("expected a task, got {:?}", other),
            }
        });

        let outcome = dispatcher.process("/tmp/in.mp4", None).await.unwrap();
        assert_eq!(outcome, Outcome::success("bonjour"));
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn timeout_yields_failure_without_retracting_task() {
        let queue = TaskQueue::new();
        let dispatcher = Dispatcher::new(queue.clone());

        let outcome = dispatcher
            .process_with_timeout("/tmp/slow.mp4", None, Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::failure("processing timed out"));

        // The task is still claimable; the late result is discarded.
        match queue.claim().await {
            Some(QueueItem::Task(task)) => {
                assert!(task.result.send(Outcome::success("late")).is_err());
            }
            other => panic!("expected the abandoned task, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_rejected() {
        let queue = TaskQueue::new();
        let dispatcher = Dispatcher::new(queue.clone());
        queue.shutdown(0);

        let err = dispatcher.process("/tmp/in.mp4", None).await.unwrap_err();
        assert!(matches!(err, crate::QueueError::Shutdown));
    }
}
