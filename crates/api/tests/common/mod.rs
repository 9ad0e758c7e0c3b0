#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use charvid_api::config::ServerConfig;
use charvid_api::router::build_app_router;
use charvid_api::state::AppState;
use charvid_core::job::Job;
use charvid_core::store::MemoryJobStore;
use charvid_svd::{RetryConfig, SvdClient};

/// A fully wired application against temp asset directories.
///
/// Keep the handle alive for the duration of the test: dropping it
/// deletes the temp directories.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub tmp: TempDir,
}

/// Build a test `ServerConfig` rooted in `tmp`, with the fallback
/// generator's simulated latency disabled.
pub fn test_config(tmp: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        hf_token: None,
        hf_api_url: "http://127.0.0.1:9/unused".to_string(),
        uploads_dir: tmp.path().join("uploads"),
        videos_dir: tmp.path().join("videos"),
        mock_latency_secs: 0,
    }
}

/// Millisecond-scale retry policy so retry paths stay fast under test.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(20),
        multiplier: 1.5,
    }
}

/// Build the application without an inference client (fallback path).
pub fn build_test_app() -> TestApp {
    build_app(None)
}

/// Build the application with an inference client pointed at `api_url`
/// (a local stub in tests).
pub fn build_test_app_with_inference(api_url: &str) -> TestApp {
    build_app(Some(Arc::new(SvdClient::new(
        api_url.to_string(),
        "test-token".to_string(),
    ))))
}

fn build_app(svd: Option<Arc<SvdClient>>) -> TestApp {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&tmp);
    std::fs::create_dir_all(&config.uploads_dir).unwrap();
    std::fs::create_dir_all(&config.videos_dir).unwrap();

    let state = AppState {
        store: Arc::new(MemoryJobStore::new()),
        svd,
        retry: Arc::new(fast_retry()),
        config: Arc::new(config),
    };

    TestApp {
        router: build_app_router(state.clone()),
        state,
        tmp,
    }
}

/// Issue a GET request against the router.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Read a response body to completion and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body to completion as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Build a single-field multipart body. Returns `(content_type, body)`.
pub fn multipart_body(
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> (String, Vec<u8>) {
    let boundary = "test-boundary-7d0e8a1c";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Bytes that pass image magic-number sniffing as PNG.
pub fn png_fixture() -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D]);
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&[0u8; 64]);
    data
}

/// Poll the store until the job reaches a terminal state.
pub async fn wait_for_terminal(state: &AppState, id: Uuid) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let job = state.store.get(id).await.expect("job must exist");
        if job.status.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {id} did not reach a terminal state in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Assert a JSON error envelope has the expected code, returning it.
pub async fn assert_error_code(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
    assert!(json["error"].is_string());
}
