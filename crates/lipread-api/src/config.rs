//! API server configuration.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: String,
    /// Allowed CORS origins ("*" allows any)
    pub cors_origins: Vec<String>,
    /// Where uploads are staged before dispatch
    pub upload_dir: PathBuf,
    /// How long a request waits for its transcription
    pub dispatch_timeout: Duration,
    /// Upload size cap
    pub max_upload_bytes: usize,
    /// Extract (or synthesize) an audio track and dispatch that instead of
    /// the raw upload
    pub audio_mode: bool,
    /// Shared landmarks file forwarded with every task
    pub landmarks_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5001".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            upload_dir: std::env::temp_dir(),
            dispatch_timeout: Duration::from_secs(120),
            max_upload_bytes: 100 * 1024 * 1024,
            audio_mode: false,
            landmarks_file: None,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            dispatch_timeout: Duration::from_secs(
                std::env::var("DISPATCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_upload_bytes: std::env::var("MAX_UPLOAD_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
            audio_mode: std::env::var("AUDIO_MODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            landmarks_file: std::env::var("LANDMARKS_FILE").ok().map(PathBuf::from),
        }
    }
}
