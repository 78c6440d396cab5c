//! FFmpeg CLI wrapper for the LipRead backend.
//!
//! Clips are encoded by streaming raw frames into an ffmpeg child process;
//! audio tracks are probed with ffprobe and extracted (or synthesized as
//! silence) the same way. No media library is linked in-process.

pub mod error;
pub mod ffmpeg;

pub use error::{MediaError, MediaResult};
pub use ffmpeg::{
    encode_clip, extract_audio, ffmpeg_path, ffprobe_path, has_audio_stream,
    has_supported_extension, raw_frame_len, AudioTrack, RAW_PIXEL_FORMAT,
};
