//! End-to-end handler tests with a fake engine behind the real pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use lipread_api::{create_router, ApiConfig, AppState};
use lipread_engine::{EngineError, EngineFactory, EngineResult, TranscriptionEngine};
use lipread_queue::{Dispatcher, TaskQueue};
use lipread_worker::{PoolConfig, WorkerPool};

/// Engine that reads the staged artifact and fails on a "corrupt" payload.
struct EchoEngine;

#[async_trait]
impl TranscriptionEngine for EchoEngine {
    async fn transcribe(
        &mut self,
        media_path: &Path,
        _landmarks_path: Option<&Path>,
    ) -> EngineResult<String> {
        let bytes = tokio::fs::read(media_path)
            .await
            .map_err(|e| EngineError::inference_failed(e.to_string()))?;
        if bytes.windows(7).any(|w| w == b"corrupt") {
            return Err(EngineError::inference_failed("unreadable media"));
        }
        Ok("hello from the pool".to_string())
    }
}

struct EchoFactory;

#[async_trait]
impl EngineFactory for EchoFactory {
    async fn create(&self, _worker_id: usize) -> EngineResult<Box<dyn TranscriptionEngine>> {
        Ok(Box::new(EchoEngine))
    }
}

async fn test_state(upload_dir: PathBuf) -> (AppState, WorkerPool) {
    let queue = TaskQueue::new();
    let pool = WorkerPool::start(PoolConfig { workers: 2 }, Arc::new(EchoFactory), queue.clone())
        .await
        .unwrap();
    let dispatcher = Dispatcher::with_timeout(queue, Duration::from_secs(5));
    let config = ApiConfig {
        upload_dir,
        cors_origins: vec!["*".to_string()],
        ..ApiConfig::default()
    };
    let state = AppState::new(config, dispatcher, pool.live_workers(), None);
    (state, pool)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn raw_request(filename: &str, payload: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header("X-Filename", filename)
        .body(Body::from(payload))
        .unwrap()
}

#[tokio::test]
async fn raw_body_upload_is_transcribed() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;
    let queue = state.queue.clone();

    let response = create_router(state)
        .oneshot(raw_request("clip.mp4", "raw video bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transcription"], "hello from the pool");

    // The staged upload is deleted by the worker that processed it.
    queue.drained().await;
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    pool.shutdown().await;
}

#[tokio::test]
async fn multipart_upload_is_transcribed() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;

    let boundary = "lipread-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"clip.webm\"\r\n\
         Content-Type: video/webm\r\n\r\n\
         raw video bytes\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transcription"], "hello from the pool");

    pool.shutdown().await;
}

#[tokio::test]
async fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;

    let response = create_router(state)
        .oneshot(raw_request("notes.txt", "plain text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains(".mp4"));

    pool.shutdown().await;
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;

    let response = create_router(state)
        .oneshot(raw_request("clip.mp4", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    pool.shutdown().await;
}

#[tokio::test]
async fn engine_failure_maps_to_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;
    let queue = state.queue.clone();

    let response = create_router(state)
        .oneshot(raw_request("clip.mp4", "corrupt payload"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("unreadable media"));

    // Failed inputs are cleaned up like successful ones.
    queue.drained().await;
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    pool.shutdown().await;
}

#[tokio::test]
async fn shutdown_rejects_new_uploads_and_flips_readiness() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;
    let router = create_router(state);

    pool.shutdown().await;

    let response = router
        .clone()
        .oneshot(raw_request("clip.mp4", "raw video bytes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // No orphaned staging file is left behind for a rejected upload.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_reports_pool_shape() {
    let dir = tempfile::tempdir().unwrap();
    let (state, pool) = test_state(dir.path().to_path_buf()).await;

    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["workers"], 2);
    assert_eq!(body["queue_depth"], 0);
    assert_eq!(body["accepting"], true);

    pool.shutdown().await;
}
