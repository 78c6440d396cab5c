//! Capture session driver: frames in, clips out.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lipread_models::Outcome;
use lipread_queue::Dispatcher;

use crate::error::{CaptureError, CaptureResult};
use crate::frame::{Frame, FrameSource};
use crate::segmenter::{ClipSegmenter, SegmenterConfig};

/// Receives each completed clip window. Delivery runs on its own task so
/// the capture loop never waits on encoding or inference.
#[async_trait]
pub trait ClipSink: Send + Sync + 'static {
    async fn deliver(&self, clip_seq: u64, frames: Vec<Frame>);
}

/// Production sink: encode the window to an mp4 in the clip directory and
/// submit it to the pool, logging whatever comes back.
pub struct DispatchSink {
    dispatcher: Dispatcher,
    clip_dir: PathBuf,
    fps: u32,
    landmarks_file: Option<PathBuf>,
}

impl DispatchSink {
    pub fn new(dispatcher: Dispatcher, config: &SegmenterConfig) -> Self {
        Self {
            dispatcher,
            clip_dir: config.clip_dir.clone(),
            fps: config.fps,
            landmarks_file: config.landmarks_file.clone(),
        }
    }
}

#[async_trait]
impl ClipSink for DispatchSink {
    async fn deliver(&self, clip_seq: u64, frames: Vec<Frame>) {
        let Some(first) = frames.first() else {
            return;
        };
        let (width, height) = (first.width, first.height);

        let clip_path = self.clip_dir.join(format!(
            "live_clip_{}_{clip_seq}.mp4",
            chrono::Utc::now().timestamp_millis()
        ));

        let data: Vec<Arc<[u8]>> = frames.iter().map(|f| f.data.clone()).collect();
        if let Err(e) =
            lipread_media::encode_clip(&clip_path, &data, width, height, self.fps).await
        {
            warn!(clip = clip_seq, error = %e, "failed to encode clip");
            return;
        }

        match self
            .dispatcher
            .process(clip_path, self.landmarks_file.clone())
            .await
        {
            Ok(Outcome::Success { transcription }) => {
                info!(clip = clip_seq, %transcription, "live transcription");
            }
            Ok(Outcome::Failure { error }) => {
                warn!(clip = clip_seq, %error, "live transcription failed");
            }
            Err(e) => {
                warn!(clip = clip_seq, error = %e, "clip rejected by queue");
            }
        }
    }
}

/// Run the capture loop until cancelled or the device gives out.
///
/// The source is polled on a fixed interval; missed ticks are skipped
/// (dropping frames is acceptable, stalling the loop is not). Completed
/// windows are handed to the sink on spawned tasks, so the only work on
/// the capture path is a buffer push and an `Arc` clone per frame.
pub async fn run_session<S: FrameSource>(
    mut source: S,
    config: SegmenterConfig,
    sink: Arc<dyn ClipSink>,
    cancel: CancellationToken,
) -> CaptureResult<()> {
    let mut segmenter = ClipSegmenter::new(&config, tokio::time::Instant::now().into_std());
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1) / config.fps);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut consecutive_failures = 0usize;
    let mut clip_seq = 0u64;

    info!(
        fps = config.fps,
        frames_per_clip = config.frames_per_clip(),
        policy = ?config.policy,
        "capture session started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("capture session cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        match source.next_frame().await {
            Ok(Some(frame)) => {
                consecutive_failures = 0;
                let now = tokio::time::Instant::now().into_std();
                if let Some(window) = segmenter.push_frame(frame, now) {
                    clip_seq += 1;
                    let sink = sink.clone();
                    tokio::spawn(async move { sink.deliver(clip_seq, window).await });
                }
            }
            Ok(None) => {
                consecutive_failures += 1;
                warn!(consecutive_failures, "failed to capture frame");
                if consecutive_failures >= config.max_consecutive_failures {
                    return Err(CaptureError::TooManyFailures(consecutive_failures));
                }
            }
            Err(e) => return Err(e),
        }
    }

    if config.flush_partial {
        if let Some(window) = segmenter.flush() {
            clip_seq += 1;
            info!(clip = clip_seq, frames = window.len(), "flushing final partial clip");
            let sink = sink.clone();
            tokio::spawn(async move { sink.deliver(clip_seq, window).await });
        }
    }

    info!(clips = clip_seq, "capture session stopped");
    Ok(())
}
