//! API server entry point.

use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use lipread_api::{create_router, ApiConfig, AppState};
use lipread_engine::HttpEngineFactory;
use lipread_queue::{Dispatcher, TaskQueue};
use lipread_worker::{PoolConfig, WorkerPool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env();
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing metrics recorder")?;

    let queue = TaskQueue::new();
    let factory = Arc::new(HttpEngineFactory::from_env());
    let pool = WorkerPool::start(PoolConfig::from_env(), factory, queue.clone()).await?;

    let dispatcher = Dispatcher::with_timeout(queue, config.dispatch_timeout);
    let state = AppState::new(
        config.clone(),
        dispatcher,
        pool.live_workers(),
        Some(metrics),
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %listener.local_addr()?, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight requests are done; drain whatever the pool still holds.
    pool.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
