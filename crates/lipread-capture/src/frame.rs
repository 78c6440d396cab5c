//! Frames and the capture device port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CaptureResult;

/// One captured video frame, packed RGB.
///
/// Pixel data sits behind an `Arc` so a clip window materializes by
/// cloning handles, never pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: impl Into<Arc<[u8]>>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
        }
    }
}

/// A capture device polled once per frame interval.
///
/// `Ok(Some(frame))` is a successful poll, `Ok(None)` a miss (the session
/// stops after a configured number of consecutive misses), `Err` a device
/// fault that ends the session immediately.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> CaptureResult<Option<Frame>>;

    /// Nominal frame rate of the device.
    fn fps(&self) -> u32;
}
