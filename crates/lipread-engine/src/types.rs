//! Model server request/response types.

use serde::{Deserialize, Serialize};

/// Transcription request sent to the model server. Paths are exchanged
/// rather than payloads: the model server shares the filesystem with the
/// pool (same host or a shared tmpfs volume).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeRequest {
    /// Path to the media artifact to transcribe.
    pub media_path: String,
    /// Optional path to a precomputed facial-landmarks file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks_path: Option<String>,
}

/// Transcription response from the model server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeResponse {
    /// The recognized text.
    pub transcription: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
