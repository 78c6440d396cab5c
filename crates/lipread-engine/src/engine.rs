//! Inference engine ports.

use std::path::Path;

use async_trait::async_trait;

use crate::error::EngineResult;

/// A loaded visual-speech-recognition pipeline.
///
/// One instance is owned exclusively by one worker (`&mut self`); model
/// state is never shared across workers. An instance must survive repeated
/// calls without reinitialization: construction is the expensive part and
/// happens once, at pool startup.
#[async_trait]
pub trait TranscriptionEngine: Send {
    /// Transcribe the media artifact at `media_path`. When
    /// `landmarks_path` is absent the engine runs its own face tracking.
    async fn transcribe(
        &mut self,
        media_path: &Path,
        landmarks_path: Option<&Path>,
    ) -> EngineResult<String>;
}

/// Builds one engine instance per worker.
///
/// A failed build is the worker-startup failure path: the affected worker
/// never enters its claim loop and the pool continues at reduced capacity.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(&self, worker_id: usize) -> EngineResult<Box<dyn TranscriptionEngine>>;
}
