//! Batch transcription entry point.
//!
//! Takes media files as arguments, runs them all through the pool and
//! prints one transcription (or failure) per file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use lipread_engine::HttpEngineFactory;
use lipread_models::Outcome;
use lipread_queue::{Dispatcher, TaskQueue};
use lipread_worker::{PoolConfig, WorkerPool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let files: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if files.is_empty() {
        anyhow::bail!("usage: lipread-batch <media-file>...");
    }
    for file in &files {
        if !file.is_file() {
            anyhow::bail!("no such file: {}", file.display());
        }
    }

    let queue = TaskQueue::new();
    let factory = Arc::new(HttpEngineFactory::from_env());
    let pool = WorkerPool::start(PoolConfig::from_env(), factory, queue.clone()).await?;
    let dispatcher = Dispatcher::new(queue);

    let landmarks = std::env::var("LANDMARKS_FILE").ok().map(PathBuf::from);

    // The pool deletes whatever it processes, so each input is staged as a
    // copy and the user's files survive.
    let staging = tempfile::tempdir().context("creating staging directory")?;

    let mut jobs = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input.mp4".to_string());
        let staged = staging.path().join(format!("{index:04}_{name}"));
        tokio::fs::copy(file, &staged)
            .await
            .with_context(|| format!("staging {}", file.display()))?;

        let dispatcher = dispatcher.clone();
        let landmarks = landmarks.clone();
        let original = file.clone();
        jobs.push(tokio::spawn(async move {
            let outcome = dispatcher.process(staged, landmarks).await;
            (original, outcome)
        }));
    }

    let total = jobs.len();
    let mut failures = 0usize;
    for job in jobs {
        let (file, outcome) = job.await.context("dispatch task panicked")?;
        match outcome {
            Ok(Outcome::Success { transcription }) => {
                info!(file = %file.display(), %transcription, "transcribed");
            }
            Ok(Outcome::Failure { error }) => {
                failures += 1;
                error!(file = %file.display(), %error, "transcription failed");
            }
            Err(e) => {
                failures += 1;
                error!(file = %file.display(), error = %e, "submission rejected");
            }
        }
    }

    pool.shutdown().await;

    if failures > 0 {
        anyhow::bail!("{failures} of {total} files failed");
    }
    Ok(())
}
