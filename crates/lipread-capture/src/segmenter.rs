//! Sliding-window clip segmentation.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::buffer::ClipBuffer;
use crate::frame::Frame;

/// What happens to the buffer after a clip is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Drop the buffered frames; consecutive clips share none and the next
    /// emission waits for the buffer to refill (cadence = clip duration).
    #[default]
    Clear,
    /// Keep the buffer rolling; emissions follow the overlap interval and
    /// consecutive clips share `clip_duration − overlap_interval` of
    /// footage.
    Rolling,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clear" => Ok(OverlapPolicy::Clear),
            "rolling" => Ok(OverlapPolicy::Rolling),
            other => Err(format!("unknown overlap policy: {other}")),
        }
    }
}

/// Segmenter configuration.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Length of each emitted clip
    pub clip_duration: Duration,
    /// Minimum time between emissions
    pub overlap_interval: Duration,
    /// Capture frame rate
    pub fps: u32,
    /// Buffer handling after emission
    pub policy: OverlapPolicy,
    /// Where clip artifacts are written
    pub clip_dir: PathBuf,
    /// Shared landmarks file forwarded with every clip
    pub landmarks_file: Option<PathBuf>,
    /// Emit the buffered remainder as a final short clip on stop
    pub flush_partial: bool,
    /// Consecutive capture misses tolerated before the session stops
    pub max_consecutive_failures: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            clip_duration: Duration::from_secs(3),
            overlap_interval: Duration::from_secs(2),
            fps: 30,
            policy: OverlapPolicy::default(),
            clip_dir: default_clip_dir(),
            landmarks_file: None,
            flush_partial: false,
            max_consecutive_failures: 30,
        }
    }
}

// Clips live a few seconds; prefer the RAM disk when the host has one.
fn default_clip_dir() -> PathBuf {
    let shm = PathBuf::from("/dev/shm");
    if shm.is_dir() {
        shm
    } else {
        std::env::temp_dir()
    }
}

impl SegmenterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            clip_duration: Duration::from_secs(
                std::env::var("CLIP_DURATION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
            ),
            overlap_interval: Duration::from_secs(
                std::env::var("OVERLAP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            fps: std::env::var("CAPTURE_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(30),
            policy: std::env::var("OVERLAP_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            clip_dir: std::env::var("CLIP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.clip_dir),
            landmarks_file: std::env::var("LANDMARKS_FILE").ok().map(PathBuf::from),
            flush_partial: std::env::var("FLUSH_PARTIAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            max_consecutive_failures: std::env::var("MAX_CAPTURE_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Frames per emitted clip.
    pub fn frames_per_clip(&self) -> usize {
        (self.clip_duration.as_secs_f64() * f64::from(self.fps)) as usize
    }
}

/// Turns a continuous frame stream into discrete fixed-duration windows.
///
/// Pure state machine: the caller supplies the clock, which keeps the
/// cadence testable without sleeping. Two state variables, the rolling
/// buffer and the last emission time.
pub struct ClipSegmenter {
    buffer: ClipBuffer,
    last_emit: Instant,
    overlap_interval: Duration,
    policy: OverlapPolicy,
}

impl ClipSegmenter {
    pub fn new(config: &SegmenterConfig, started: Instant) -> Self {
        Self {
            buffer: ClipBuffer::new(config.frames_per_clip()),
            last_emit: started,
            overlap_interval: config.overlap_interval,
            policy: config.policy,
        }
    }

    /// Feed one captured frame. Returns the materialized window when a
    /// full clip is due.
    pub fn push_frame(&mut self, frame: Frame, now: Instant) -> Option<Vec<Frame>> {
        self.buffer.push(frame);

        if now.duration_since(self.last_emit) >= self.overlap_interval && self.buffer.is_full() {
            let window = self.buffer.snapshot();
            self.last_emit = now;
            if self.policy == OverlapPolicy::Clear {
                self.buffer.clear();
            }
            return Some(window);
        }
        None
    }

    /// Emit whatever is buffered as a final, possibly short, window.
    pub fn flush(&mut self) -> Option<Vec<Frame>> {
        if self.buffer.is_empty() {
            return None;
        }
        let window = self.buffer.snapshot();
        self.buffer.clear();
        Some(window)
    }
}
