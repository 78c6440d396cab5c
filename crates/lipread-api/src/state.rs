//! Application state.

use metrics_exporter_prometheus::PrometheusHandle;

use lipread_queue::{Dispatcher, TaskQueue};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub dispatcher: Dispatcher,
    pub queue: TaskQueue,
    /// Workers that actually came up at pool startup.
    pub live_workers: usize,
    /// Absent when no Prometheus recorder is installed (tests).
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        dispatcher: Dispatcher,
        live_workers: usize,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let queue = dispatcher.queue().clone();
        Self {
            config,
            dispatcher,
            queue,
            live_workers,
            metrics,
        }
    }
}
