//! In-process task queue shared by all producers and all workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics::gauge;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::debug;

use crate::error::{QueueError, QueueResult};
use crate::task::{QueueItem, Task};

/// Multi-producer/multi-consumer FIFO of [`Task`]s.
///
/// The channel is unbounded: producers (HTTP handlers, the capture loop)
/// must never block on admission. Overload is bounded upstream instead,
/// since dispatchers give up after their timeout and pool throughput caps
/// how fast depth can grow; depth is observable via [`TaskQueue::len`].
///
/// Shutdown uses one [`QueueItem::Shutdown`] sentinel per live worker.
/// Sentinels are pushed after all previously enqueued tasks, so FIFO order
/// guarantees the queue drains before workers exit.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    tx: mpsc::UnboundedSender<QueueItem>,
    rx: Mutex<mpsc::UnboundedReceiver<QueueItem>>,
    shutdown: AtomicBool,
    // Tasks enqueued but not yet acknowledged via `task_done`. Includes
    // tasks currently being processed.
    outstanding: watch::Sender<usize>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (outstanding, _) = watch::channel(0);
        Self {
            inner: Arc::new(QueueInner {
                tx,
                rx: Mutex::new(rx),
                shutdown: AtomicBool::new(false),
                outstanding,
            }),
        }
    }

    /// Enqueue a task. Non-blocking; fails with [`QueueError::Shutdown`]
    /// once shutdown has been initiated.
    pub fn enqueue(&self, task: Task) -> QueueResult<()> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(QueueError::Shutdown);
        }

        self.inner.outstanding.send_modify(|n| *n += 1);
        debug!(task_id = %task.id, "task enqueued");

        if self.inner.tx.send(QueueItem::Task(task)).is_err() {
            self.inner.outstanding.send_modify(|n| *n -= 1);
            return Err(QueueError::Closed);
        }

        gauge!("lipread_queue_depth").set(self.len() as f64);
        Ok(())
    }

    /// Claim the next item, waiting until one is available.
    ///
    /// Returns `None` only if the queue handle itself has been dropped;
    /// the normal stop path is a [`QueueItem::Shutdown`] sentinel.
    pub async fn claim(&self) -> Option<QueueItem> {
        self.inner.rx.lock().await.recv().await
    }

    /// Acknowledge completion of a previously claimed task.
    pub fn task_done(&self) {
        self.inner
            .outstanding
            .send_modify(|n| *n = n.saturating_sub(1));
        gauge!("lipread_queue_depth").set(self.len() as f64);
    }

    /// Initiate shutdown: reject further enqueues and push exactly
    /// `workers` stop sentinels so each live worker exits exactly once.
    pub fn shutdown(&self, workers: usize) {
        self.inner.shutdown.store(true, Ordering::Release);
        for _ in 0..workers {
            // Sentinels queue behind pending tasks; workers drain first.
            let _ = self.inner.tx.send(QueueItem::Shutdown);
        }
    }

    /// Whether shutdown has been initiated.
    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Wait until every enqueued task has been acknowledged.
    pub async fn drained(&self) {
        let mut rx = self.inner.outstanding.subscribe();
        // wait_for inspects the current value first, so a queue that is
        // already empty returns immediately.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Number of tasks enqueued but not yet acknowledged (pending plus
    /// in-flight).
    pub fn len(&self) -> usize {
        *self.inner.outstanding.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
