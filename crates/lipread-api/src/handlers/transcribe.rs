//! Upload-and-transcribe handler.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Serialize;
use tracing::{debug, info, warn};

use lipread_models::{Outcome, TaskId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Transcription response.
#[derive(Serialize)]
pub struct ProcessResponse {
    pub transcription: String,
}

/// `POST /process`: accept a video either as a `multipart/form-data`
/// `file` field or as a raw body with an `X-Filename` header, stage it,
/// run it through the pool and answer with the transcription.
pub async fn process_media(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<ProcessResponse>> {
    let (filename, data) = read_upload(&state, request).await?;

    if data.is_empty() {
        return Err(ApiError::bad_request("no data received"));
    }
    if !lipread_media::has_supported_extension(&filename) {
        return Err(ApiError::bad_request(
            "only .mp4 or .webm files are allowed",
        ));
    }

    // Stage under a fresh task-scoped name; the worker that processes the
    // artifact deletes it.
    let task_id = TaskId::new();
    let extension = if filename.to_ascii_lowercase().ends_with(".mp4") {
        "mp4"
    } else {
        "webm"
    };
    let media_path = state
        .config
        .upload_dir
        .join(format!("{task_id}.{extension}"));
    tokio::fs::write(&media_path, &data).await?;
    info!(
        filename = %filename,
        bytes = data.len(),
        media = %media_path.display(),
        "upload staged"
    );

    let dispatch_path = if state.config.audio_mode {
        prepare_audio(&media_path).await?
    } else {
        media_path
    };

    let outcome = match state
        .dispatcher
        .process(dispatch_path.clone(), state.config.landmarks_file.clone())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            // Nothing will ever claim a rejected task; clean up here.
            if let Err(remove_err) = tokio::fs::remove_file(&dispatch_path).await {
                warn!(
                    media = %dispatch_path.display(),
                    error = %remove_err,
                    "failed to remove rejected upload"
                );
            }
            return Err(e.into());
        }
    };

    match outcome {
        Outcome::Success { transcription } => Ok(Json(ProcessResponse { transcription })),
        Outcome::Failure { error } => Err(ApiError::Inference(error)),
    }
}

/// Pull the upload out of either supported request shape.
async fn read_upload(state: &AppState, request: Request) -> ApiResult<(String, Bytes)> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
        {
            if field.name() == Some("file") {
                let filename = field.file_name().unwrap_or("upload.mp4").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
                return Ok((filename, data));
            }
        }
        Err(ApiError::bad_request("no file part in the request"))
    } else {
        let filename = request
            .headers()
            .get("X-Filename")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| "upload.webm".to_string());
        let data = axum::body::to_bytes(request.into_body(), state.config.max_upload_bytes)
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read request body: {e}")))?;
        Ok((filename, data))
    }
}

/// Swap the staged upload for a WAV of its audio track (or synthesized
/// silence when it has none).
async fn prepare_audio(media_path: &Path) -> ApiResult<PathBuf> {
    let wav_path = media_path.with_extension("wav");
    let extraction = lipread_media::extract_audio(media_path, &wav_path).await;

    // The raw upload is no longer needed either way.
    if let Err(e) = tokio::fs::remove_file(media_path).await {
        warn!(
            media = %media_path.display(),
            error = %e,
            "failed to remove raw upload"
        );
    }

    let track = extraction?;
    debug!(?track, wav = %wav_path.display(), "audio track prepared");
    Ok(wav_path)
}
