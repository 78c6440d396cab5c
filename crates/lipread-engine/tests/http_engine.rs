//! HTTP engine tests against a mock model server.

use std::path::Path;
use std::time::Duration;

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lipread_engine::{EngineConfig, EngineError, HttpEngine, TranscriptionEngine};

fn config_for(server: &MockServer) -> EngineConfig {
    EngineConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        max_retries: 0,
    }
}

async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok"
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn transcribe_returns_text_on_success() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .and(body_json(serde_json::json!({ "media_path": "/tmp/clip.mp4" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transcription": "nice to meet you"
        })))
        .mount(&server)
        .await;

    let mut engine = HttpEngine::connect(config_for(&server)).await.unwrap();
    let text = engine
        .transcribe(Path::new("/tmp/clip.mp4"), None)
        .await
        .unwrap();
    assert_eq!(text, "nice to meet you");
}

#[tokio::test]
async fn transcribe_sends_landmarks_path_when_present() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .and(body_json(serde_json::json!({
            "media_path": "/tmp/clip.mp4",
            "landmarks_path": "/data/landmarks.pkl"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transcription": "with landmarks"
        })))
        .mount(&server)
        .await;

    let mut engine = HttpEngine::connect(config_for(&server)).await.unwrap();
    let text = engine
        .transcribe(
            Path::new("/tmp/clip.mp4"),
            Some(Path::new("/data/landmarks.pkl")),
        )
        .await
        .unwrap();
    assert_eq!(text, "with landmarks");
}

#[tokio::test]
async fn model_server_error_maps_to_inference_failure() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .respond_with(ResponseTemplate::new(500).set_body_string("face not detected"))
        .mount(&server)
        .await;

    let mut engine = HttpEngine::connect(config_for(&server)).await.unwrap();
    let err = engine
        .transcribe(Path::new("/tmp/corrupt.mp4"), None)
        .await
        .unwrap_err();

    match err {
        EngineError::InferenceFailed(msg) => {
            assert!(msg.contains("face not detected"), "got: {msg}");
        }
        other => panic!("expected InferenceFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn connect_fails_when_model_server_is_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = HttpEngine::connect(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, EngineError::Startup(_)));
}
