//! HTTP engine backed by the model server.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::engine::{EngineFactory, TranscriptionEngine};
use crate::error::{EngineError, EngineResult};
use crate::types::{HealthResponse, TranscribeRequest, TranscribeResponse};

/// Configuration for the HTTP engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the model server
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Max retries for transient transport faults
    pub max_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(300), // lip reading a clip can be slow on CPU
            max_retries: 2,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("MODEL_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("MODEL_SERVER_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            max_retries: std::env::var("MODEL_SERVER_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// Engine that delegates inference to the model server over HTTP.
#[derive(Debug)]
pub struct HttpEngine {
    http: Client,
    config: EngineConfig,
}

impl HttpEngine {
    /// Create a new engine without probing the model server.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EngineError::Network)?;

        Ok(Self { http, config })
    }

    /// Create a new engine and verify the model server is reachable.
    /// An unreachable or unhealthy server is a startup failure.
    pub async fn connect(config: EngineConfig) -> EngineResult<Self> {
        let engine = Self::new(config)?;
        if !engine.health_check().await? {
            return Err(EngineError::startup(format!(
                "model server at {} is not healthy",
                engine.config.base_url
            )));
        }
        Ok(engine)
    }

    /// Check if the model server is healthy.
    pub async fn health_check(&self) -> EngineResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("model server health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("model server health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Execute with retry logic for transient transport faults.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> EngineResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = EngineResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "model server request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| EngineError::inference_failed("unknown model server error")))
    }
}

#[async_trait]
impl TranscriptionEngine for HttpEngine {
    async fn transcribe(
        &mut self,
        media_path: &Path,
        landmarks_path: Option<&Path>,
    ) -> EngineResult<String> {
        let url = format!("{}/transcribe", self.config.base_url);
        let request = TranscribeRequest {
            media_path: media_path.to_string_lossy().into_owned(),
            landmarks_path: landmarks_path.map(|p| p.to_string_lossy().into_owned()),
        };

        debug!(media = %request.media_path, "sending transcription request to {}", url);

        let response = self
            .with_retry(|| async {
                self.http
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(EngineError::Network)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::inference_failed(format!(
                "model server returned {}: {}",
                status, body
            )));
        }

        let transcribed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        Ok(transcribed.transcription)
    }
}

/// Factory producing one [`HttpEngine`] per worker.
pub struct HttpEngineFactory {
    config: EngineConfig,
}

impl HttpEngineFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }
}

#[async_trait]
impl EngineFactory for HttpEngineFactory {
    async fn create(&self, worker_id: usize) -> EngineResult<Box<dyn TranscriptionEngine>> {
        debug!(worker = worker_id, "connecting engine to model server");
        let engine = HttpEngine::connect(self.config.clone()).await?;
        Ok(Box::new(engine))
    }
}
