//! Round-trip tests against a real ffmpeg binary.

use lipread_media::{encode_clip, extract_audio, raw_frame_len, AudioTrack};

/// Encode a short synthetic clip and check the container exists.
#[tokio::test]
#[ignore = "requires ffmpeg in PATH"]
async fn encode_clip_produces_playable_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("clip.mp4");

    let (width, height, fps) = (64, 48, 30);
    let frames: Vec<Vec<u8>> = (0..fps)
        .map(|i| vec![(i * 8) as u8; raw_frame_len(width, height)])
        .collect();

    encode_clip(&output, &frames, width, height, fps).await.unwrap();

    let size = std::fs::metadata(&output).unwrap().len();
    assert!(size > 0, "encoded clip is empty");
}

/// A silent video gets a synthesized audio track, not an error.
#[tokio::test]
#[ignore = "requires ffmpeg in PATH"]
async fn extract_audio_falls_back_to_silence() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("silent.mp4");
    let wav = dir.path().join("silent.wav");

    let (width, height, fps) = (64, 48, 30);
    let frames: Vec<Vec<u8>> = (0..fps).map(|_| vec![0u8; raw_frame_len(width, height)]).collect();
    encode_clip(&video, &frames, width, height, fps).await.unwrap();

    let track = extract_audio(&video, &wav).await.unwrap();
    assert_eq!(track, AudioTrack::Silence);
    assert!(wav.exists());
}
