//! Fixed-size worker pool over the shared task queue.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use lipread_engine::{EngineFactory, TranscriptionEngine};
use lipread_models::Outcome;
use lipread_queue::{QueueItem, Task, TaskQueue};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};

/// A fixed set of long-lived workers, each owning one engine instance.
///
/// Workers coordinate only through the queue and per-task result sinks;
/// engines are never shared, so no locking guards model state. The pool is
/// created once at process start and torn down with [`WorkerPool::shutdown`],
/// which drains every already-enqueued task before workers exit.
pub struct WorkerPool {
    queue: TaskQueue,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Build one engine per requested worker and spawn the claim loops.
    ///
    /// A worker whose engine fails to build is logged and skipped; the
    /// pool runs at reduced capacity and pending tasks simply wait longer.
    /// Zero live workers means zero capacity and fails loudly.
    pub async fn start(
        config: PoolConfig,
        factory: Arc<dyn EngineFactory>,
        queue: TaskQueue,
    ) -> PoolResult<Self> {
        let mut handles = Vec::with_capacity(config.workers);

        for worker_id in 0..config.workers {
            match factory.create(worker_id).await {
                Ok(engine) => {
                    let queue = queue.clone();
                    handles.push(tokio::spawn(run_worker(worker_id, engine, queue)));
                }
                Err(e) => {
                    error!(
                        worker = worker_id,
                        error = %e,
                        "engine startup failed; continuing with reduced capacity"
                    );
                }
            }
        }

        if handles.is_empty() {
            return Err(PoolError::NoWorkers);
        }

        info!(
            requested = config.workers,
            live = handles.len(),
            "worker pool started"
        );
        Ok(Self { queue, handles })
    }

    /// The queue this pool claims from.
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Number of workers that actually started.
    pub fn live_workers(&self) -> usize {
        self.handles.len()
    }

    /// Drain and stop: reject new submissions, let workers finish every
    /// task already in the queue, then join them. Nothing in flight is
    /// aborted.
    pub async fn shutdown(self) {
        let workers = self.handles.len();
        info!(workers, "shutting down worker pool");
        self.queue.shutdown(workers);

        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task join failed");
            }
        }
        info!("worker pool stopped");
    }
}

/// Claim loop for a single worker.
async fn run_worker(worker_id: usize, mut engine: Box<dyn TranscriptionEngine>, queue: TaskQueue) {
    info!(worker = worker_id, "worker ready");

    loop {
        match queue.claim().await {
            Some(QueueItem::Task(task)) => {
                process_task(worker_id, engine.as_mut(), &queue, task).await;
            }
            Some(QueueItem::Shutdown) => {
                debug!(worker = worker_id, "shutdown sentinel claimed");
                break;
            }
            None => {
                debug!(worker = worker_id, "queue closed");
                break;
            }
        }
    }

    info!(worker = worker_id, "worker stopped");
}

/// Process one claimed task: infer, deliver the outcome, clean up, ack.
///
/// Failures never escape: any engine error becomes a `Failure` outcome for
/// this task alone. The worker, not the waiter, deletes the input
/// artifact, exactly once, whether or not anyone is still listening.
async fn process_task(
    worker_id: usize,
    engine: &mut dyn TranscriptionEngine,
    queue: &TaskQueue,
    task: Task,
) {
    let Task {
        id,
        media_path,
        aux_path,
        result,
    } = task;

    info!(
        worker = worker_id,
        task_id = %id,
        media = %media_path.display(),
        "processing task"
    );
    let started = Instant::now();

    let outcome = match engine.transcribe(&media_path, aux_path.as_deref()).await {
        Ok(transcription) => {
            counter!("lipread_tasks_processed").increment(1);
            Outcome::success(transcription)
        }
        Err(e) => {
            warn!(
                worker = worker_id,
                task_id = %id,
                error = %e,
                "inference failed"
            );
            counter!("lipread_tasks_failed").increment(1);
            Outcome::failure(e.to_string())
        }
    };
    histogram!("lipread_task_seconds").record(started.elapsed().as_secs_f64());

    if result.send(outcome).is_err() {
        debug!(task_id = %id, "caller gave up waiting; outcome discarded");
    }

    // aux_path is caller-owned configuration (a shared landmarks file) and
    // is deliberately left alone.
    if let Err(e) = tokio::fs::remove_file(&media_path).await {
        warn!(
            task_id = %id,
            media = %media_path.display(),
            error = %e,
            "failed to remove input artifact"
        );
    }

    queue.task_done();
}
