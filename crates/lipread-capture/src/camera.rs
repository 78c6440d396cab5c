//! Camera frame source backed by an ffmpeg child process.
//!
//! The device is decoded out-of-process: ffmpeg reads the camera and
//! streams packed RGB frames over a pipe, so no camera or codec library is
//! linked into the backend.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tracing::info;

use lipread_media::{ffmpeg_path, raw_frame_len, RAW_PIXEL_FORMAT};

use crate::error::{CaptureError, CaptureResult};
use crate::frame::{Frame, FrameSource};

/// Camera configuration.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Device node or input URL
    pub device: String,
    /// ffmpeg input demuxer
    pub input_format: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            input_format: "v4l2".to_string(),
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl CameraConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            device: std::env::var("CAMERA_DEVICE").unwrap_or(defaults.device),
            input_format: std::env::var("CAMERA_INPUT_FORMAT").unwrap_or(defaults.input_format),
            width: std::env::var("CAPTURE_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.width),
            height: std::env::var("CAPTURE_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.height),
            fps: std::env::var("CAPTURE_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.fps),
        }
    }
}

/// Live camera decoded by ffmpeg into raw frames.
pub struct CameraSource {
    // Held so the decoder dies with the source.
    _child: Child,
    stdout: ChildStdout,
    frame_len: usize,
    width: u32,
    height: u32,
    fps: u32,
}

impl CameraSource {
    /// Start the decoder against the configured device.
    pub fn open(config: CameraConfig) -> CaptureResult<Self> {
        let ffmpeg = ffmpeg_path()?;
        let mut child = Command::new(ffmpeg)
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                &config.input_format,
                "-framerate",
                &config.fps.to_string(),
                "-video_size",
                &format!("{}x{}", config.width, config.height),
                "-i",
                &config.device,
                "-f",
                "rawvideo",
                "-pix_fmt",
                RAW_PIXEL_FORMAT,
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CaptureError::DeviceUnavailable(format!("no frame stream from {}", config.device))
        })?;

        info!(
            device = %config.device,
            width = config.width,
            height = config.height,
            fps = config.fps,
            "camera decoder started"
        );

        Ok(Self {
            _child: child,
            stdout,
            frame_len: raw_frame_len(config.width, config.height),
            width: config.width,
            height: config.height,
            fps: config.fps,
        })
    }
}

#[async_trait]
impl FrameSource for CameraSource {
    async fn next_frame(&mut self) -> CaptureResult<Option<Frame>> {
        let mut data = vec![0u8; self.frame_len];
        match self.stdout.read_exact(&mut data).await {
            Ok(_) => Ok(Some(Frame {
                data: Arc::from(data),
                width: self.width,
                height: self.height,
            })),
            // A short read means the decoder produced nothing this poll;
            // the session-level failure threshold decides when to stop.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn fps(&self) -> u32 {
        self.fps
    }
}
