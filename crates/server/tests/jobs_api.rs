//! Job API integration tests.
//!
//! Drives the router directly with mock capabilities: submission
//! validation, progress polling, and the not-found path.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::util::ServiceExt;

use clipfetch_core::testing::{MockFetcher, MockReencoder, MockTranscriber};
use clipfetch_core::{Config, JobStore, JobSupervisor};

fn test_router(output_dir: &TempDir) -> Router {
    let config = Config::default();
    let store = Arc::new(JobStore::new(16));
    let supervisor = Arc::new(JobSupervisor::new(
        config.supervisor.clone(),
        output_dir.path().to_path_buf(),
        Arc::clone(&store),
        Arc::new(MockFetcher::new()),
        Arc::new(MockReencoder::new()),
        Arc::new(MockTranscriber::new()),
    ));
    let state = Arc::new(clipfetch_server::state::AppState::new(
        config, store, supervisor,
    ));
    clipfetch_server::api::create_router(state)
}

async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir);

    let (status, body) = send_json(&router, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_empty_urls_rejected() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir);

    let (status, body) = send_json(
        &router,
        "POST",
        "/api/v1/jobs",
        Some(serde_json::json!({"urls": ["  ", ""]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("URL"));
}

#[tokio::test]
async fn test_submit_unknown_format_rejected() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir);

    let (status, _) = send_json(
        &router,
        "POST",
        "/api/v1/jobs",
        Some(serde_json::json!({"urls": ["https://a"], "transcript_format": "pdf"})),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_submit_and_poll_to_completion() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir);

    let (status, body) = send_json(
        &router,
        "POST",
        "/api/v1/jobs",
        Some(serde_json::json!({"urls": ["https://a, https://b"]})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["total"], 2);
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/jobs/{}/progress", job_id);
    let mut last = serde_json::Value::Null;
    for _ in 0..500 {
        let (status, body) = send_json(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let progress = body["progress"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&progress));
        last = body;
        if matches!(
            last["status"].as_str(),
            Some("completed") | Some("completed_with_warnings") | Some("error")
        ) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["status"], "completed");
    assert_eq!(last["completed"], 2);
    assert_eq!(last["completed_files"].as_array().unwrap().len(), 2);
    assert_eq!(last["failed"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_job_returns_not_found() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir);

    let (status, body) = send_json(&router, "GET", "/api/v1/jobs/no-such-id/progress", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no-such-id"));
}

#[tokio::test]
async fn test_config_endpoint_serves_config() {
    let dir = TempDir::new().unwrap();
    let router = test_router(&dir);

    let (status, body) = send_json(&router, "GET", "/api/v1/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"]["port"], 8080);
}
