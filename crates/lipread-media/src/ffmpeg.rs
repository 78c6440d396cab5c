//! FFmpeg/FFprobe CLI invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Pixel format exchanged with FFmpeg for raw frames (3 bytes per pixel).
pub const RAW_PIXEL_FORMAT: &str = "rgb24";

/// Bytes per raw frame for the given geometry.
pub fn raw_frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Whether the container format is accepted for uploads.
pub fn has_supported_extension(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    lower.ends_with(".mp4") || lower.ends_with(".webm")
}

/// Locate ffmpeg in PATH.
pub fn ffmpeg_path() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Locate ffprobe in PATH.
pub fn ffprobe_path() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

fn encode_clip_args(width: u32, height: u32, fps: u32, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        RAW_PIXEL_FORMAT.into(),
        "-s".into(),
        format!("{width}x{height}"),
        "-r".into(),
        fps.to_string(),
        "-i".into(),
        "pipe:0".into(),
        "-an".into(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "veryfast".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-movflags".into(),
        "+faststart".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn extract_audio_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vn".into(),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-ar".into(),
        "44100".into(),
        "-ac".into(),
        "2".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn silence_args(seconds: f64, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        format!("aevalsrc=0:d={seconds}"),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-ar".into(),
        "44100".into(),
        "-ac".into(),
        "2".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn probe_audio_args(input: &Path) -> Vec<String> {
    vec![
        "-v".into(),
        "error".into(),
        "-select_streams".into(),
        "a".into(),
        "-show_entries".into(),
        "stream=codec_type".into(),
        "-of".into(),
        "json".into(),
        input.to_string_lossy().into_owned(),
    ]
}

/// Encode raw frames into an H.264 MP4 clip.
///
/// Every frame must be `width * height * 3` bytes of packed RGB. Frames
/// are streamed over the child's stdin so no intermediate file is written.
pub async fn encode_clip<F>(
    output: &Path,
    frames: &[F],
    width: u32,
    height: u32,
    fps: u32,
) -> MediaResult<()>
where
    F: AsRef<[u8]>,
{
    let expected = raw_frame_len(width, height);
    for (i, frame) in frames.iter().enumerate() {
        let len = frame.as_ref().len();
        if len != expected {
            return Err(MediaError::InvalidFrame(format!(
                "frame {i} is {len} bytes, expected {expected} for {width}x{height}"
            )));
        }
    }

    let ffmpeg = ffmpeg_path()?;
    let mut child = Command::new(ffmpeg)
        .args(encode_clip_args(width, height, fps, output))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        // Scope ensures stdin closes so ffmpeg sees EOF and finalizes.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("failed to open ffmpeg stdin", None, None))?;
        for frame in frames {
            stdin.write_all(frame.as_ref()).await?;
        }
        stdin.shutdown().await?;
    }

    let result = child.wait_with_output().await?;
    if !result.status.success() {
        return Err(MediaError::ffmpeg_failed(
            format!("encoding {} failed", output.display()),
            Some(String::from_utf8_lossy(&result.stderr).into_owned()),
            result.status.code(),
        ));
    }

    debug!(
        clip = %output.display(),
        frames = frames.len(),
        "encoded clip"
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
}

fn parse_audio_streams(json: &str) -> MediaResult<bool> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    Ok(probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio")))
}

/// Check whether the input container carries an audio stream.
pub async fn has_audio_stream(input: &Path) -> MediaResult<bool> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    let ffprobe = ffprobe_path()?;
    let result = Command::new(ffprobe)
        .args(probe_audio_args(input))
        .output()
        .await?;

    if !result.status.success() {
        return Err(MediaError::ffprobe_failed(
            format!("probing {} failed", input.display()),
            Some(String::from_utf8_lossy(&result.stderr).into_owned()),
        ));
    }

    parse_audio_streams(&String::from_utf8_lossy(&result.stdout))
}

/// How the audio track handed to the engine was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioTrack {
    /// Extracted from the upload's own audio stream.
    Extracted,
    /// The upload had no audio stream; silence was synthesized so the
    /// engine still receives a well-formed WAV.
    Silence,
}

/// Extract a 16-bit PCM WAV from the input, synthesizing silence when the
/// input has no audio stream.
pub async fn extract_audio(input: &Path, output: &Path) -> MediaResult<AudioTrack> {
    let ffmpeg = ffmpeg_path()?;

    let (track, args) = if has_audio_stream(input).await? {
        (AudioTrack::Extracted, extract_audio_args(input, output))
    } else {
        warn!(input = %input.display(), "no audio stream detected, synthesizing silence");
        (AudioTrack::Silence, silence_args(3.0, output))
    };

    let result = Command::new(ffmpeg).args(args).output().await?;
    if !result.status.success() {
        return Err(MediaError::ffmpeg_failed(
            format!("audio extraction for {} failed", input.display()),
            Some(String::from_utf8_lossy(&result.stderr).into_owned()),
            result.status.code(),
        ));
    }

    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions() {
        assert!(has_supported_extension("clip.mp4"));
        assert!(has_supported_extension("CLIP.MP4"));
        assert!(has_supported_extension("upload.webm"));
        assert!(!has_supported_extension("audio.wav"));
        assert!(!has_supported_extension("mp4"));
    }

    #[test]
    fn encode_args_describe_raw_rgb_input() {
        let args = encode_clip_args(640, 480, 30, Path::new("/tmp/out.mp4"));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo"));
        assert!(joined.contains("-pix_fmt rgb24"));
        assert!(joined.contains("-s 640x480"));
        assert!(joined.contains("-r 30"));
        assert!(joined.contains("-i pipe:0"));
        assert!(joined.ends_with("/tmp/out.mp4"));
    }

    #[test]
    fn silence_args_carry_duration() {
        let args = silence_args(3.0, Path::new("/tmp/silent.wav"));
        assert!(args.iter().any(|a| a == "aevalsrc=0:d=3"));
    }

    #[test]
    fn probe_json_with_audio_stream() {
        let json = r#"{"streams":[{"codec_type":"audio"}]}"#;
        assert!(parse_audio_streams(json).unwrap());
    }

    #[test]
    fn probe_json_without_streams() {
        assert!(!parse_audio_streams(r#"{"streams":[]}"#).unwrap());
        assert!(!parse_audio_streams(r#"{}"#).unwrap());
    }

    #[test]
    fn frame_length_mismatch_is_rejected() {
        let frames = vec![vec![0u8; 10]];
        let err = tokio_test::block_on(encode_clip(
            Path::new("/tmp/out.mp4"),
            &frames,
            640,
            480,
            30,
        ))
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidFrame(_)));
    }
}
