//! Live camera transcription entry point.
//!
//! Wires the camera to the clip segmenter and the worker pool: every
//! completed clip is transcribed and logged until ctrl-c.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use lipread_capture::{run_session, CameraConfig, CameraSource, DispatchSink, SegmenterConfig};
use lipread_engine::HttpEngineFactory;
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

    let segmenter_config = SegmenterConfig::from_env();
    let camera_config = CameraConfig::from_env();

    // An unreachable camera is fatal before any pool state exists.
    let camera = CameraSource::open(camera_config)?;

    let queue = TaskQueue::new();
    let factory = Arc::new(HttpEngineFactory::from_env());
    let pool = WorkerPool::start(PoolConfig::from_env(), factory, queue.clone()).await?;
    let dispatcher = Dispatcher::new(queue);

    let sink = Arc::new(DispatchSink::new(dispatcher, &segmenter_config));
    let cancel = CancellationToken::new();
    let mut driver = tokio::spawn(run_session(
        camera,
        segmenter_config,
        sink,
        cancel.clone(),
    ));

    info!("live capture running; press ctrl-c to stop");

    // Stop capturing first and join the segmenter (releasing the camera),
    // then drain the pool so queued clips still get transcribed.
    let session_result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("stopping capture");
            cancel.cancel();
            (&mut driver).await?
        }
        result = &mut driver => result?,
    };
    pool.shutdown().await;
    session_result?;

    Ok(())
}
