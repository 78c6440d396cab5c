//! Live capture and clip segmentation for the LipRead backend.
//!
//! This crate provides:
//! - [`Frame`] / [`FrameSource`]: the capture device port
//! - [`ClipBuffer`]: the rolling frame window
//! - [`ClipSegmenter`]: fixed-duration, optionally overlapping clips
//! - [`CameraSource`]: ffmpeg-decoded live camera
//! - [`run_session`]: the capture loop, wired to a [`ClipSink`]

pub mod buffer;
pub mod camera;
pub mod error;
pub mod frame;
pub mod segmenter;
pub mod session;

pub use buffer::ClipBuffer;
pub use camera::{CameraConfig, CameraSource};
pub use error::{CaptureError, CaptureResult};
pub use frame::{Frame, FrameSource};
pub use segmenter::{ClipSegmenter, OverlapPolicy, SegmenterConfig};
pub use session::{run_session, ClipSink, DispatchSink};
