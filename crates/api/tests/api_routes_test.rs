use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use monitor_api::create_app;
use monitor_config::ServerConfig;
use monitor_testing_utils::{MockBackend, TestEnv};
use monitor_worker::WorkerLifecycle;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    lifecycle: Arc<WorkerLifecycle>,
    backend: MockBackend,
}

impl TestApp {
    fn new() -> Self {
        Self::with_body_limit(256 * 1024)
    }

    fn with_body_limit(max_body_bytes: usize) -> Self {
        let backend = MockBackend::new();
        let identity = TestEnv::identity("http://backend/external-monitoring")
            .with_heartbeat_interval_ms(0);
        let lifecycle = Arc::new(WorkerLifecycle::new(identity, Arc::new(backend.clone())));
        let server = ServerConfig {
            max_body_bytes,
            ..ServerConfig::default()
        };

        Self {
            router: create_app(Arc::clone(&lifecycle), &server),
            lifecycle,
            backend,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", "worker.example")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", "worker.example")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_lists_routes_without_side_effects() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "ok": true,
            "workerId": "worker-test",
            "routes": ["/jobs", "/status", "/healthz"],
        })
    );

    assert_eq!(app.backend.registration_calls(), 0);
    assert_eq!(app.backend.heartbeat_calls(), 0);
    let stats = app.lifecycle.build_stats().await;
    assert_eq!(stats.last_registration_at, None);
    assert_eq!(stats.last_heartbeat_at, None);
}

#[tokio::test]
async fn status_registers_and_heartbeats_before_reporting() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/status")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.backend.registrations()[0].endpoint, "http://worker.example");
    assert_eq!(app.backend.heartbeat_calls(), 1);

    assert_eq!(
        body["worker"],
        json!({
            "id": "worker-test",
            "name": "Test Worker",
            "geo": "EU",
            "backendUrl": "http://backend/external-monitoring",
        })
    );
    assert!(body["stats"]["lastRegistrationAt"].is_string());
    assert!(body["stats"]["lastHeartbeatAt"].is_string());
    assert_eq!(body["stats"]["jobsProcessed"], 0);
    assert_eq!(body["stats"]["lastError"], Value::Null);
}

#[tokio::test]
async fn healthz_stays_ok_during_backend_outage() {
    let app = TestApp::new();
    app.backend.fail_registrations(5, 502, "bad gateway");
    app.backend.set_heartbeat_failure(Some((502, "bad gateway")));

    let (status, body) = app.send(get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "workerId": "worker-test" }));

    let (_, body) = app.send(get("/status")).await;
    assert_eq!(body["stats"]["lastError"], "Heartbeat failed (502): bad gateway");
    assert_eq!(body["stats"]["lastHeartbeatAt"], Value::Null);
}

#[tokio::test]
async fn jobs_are_counted_and_accepted() {
    let app = TestApp::new();

    let (status, body) = app.send(post_json("/jobs", r#"{"jobs":[{"id":1},{"id":2}]}"#)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({ "accepted": 2 }));

    let (status, body) = app.send(post_json("/jobs", r#"{"jobs":"nope"}"#)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({ "accepted": 0 }));

    let empty = Request::builder()
        .method("POST")
        .uri("/jobs")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(empty).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({ "accepted": 0 }));

    assert_eq!(app.lifecycle.build_stats().await.jobs_processed, 2);
    assert_eq!(app.backend.heartbeat_calls(), 3);
}

#[tokio::test]
async fn malformed_json_is_rejected_before_backend_traffic() {
    let app = TestApp::new();

    let (status, body) = app.send(post_json("/jobs", r#"{"jobs": ["#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

    assert_eq!(app.backend.registration_calls(), 0);
    assert_eq!(app.backend.heartbeat_calls(), 0);
}

#[tokio::test]
async fn primitive_json_body_is_rejected_before_backend_traffic() {
    let app = TestApp::new();

    let (status, body) = app.send(post_json("/jobs", "3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Invalid JSON body: expected an object or array" })
    );

    assert_eq!(app.backend.registration_calls(), 0);
    assert_eq!(app.backend.heartbeat_calls(), 0);
    assert_eq!(app.lifecycle.build_stats().await.jobs_processed, 0);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = TestApp::with_body_limit(64);
    let jobs: Vec<u32> = (0..100).collect();
    let payload = json!({ "jobs": jobs }).to_string();

    let (status, body) = app.send(post_json("/jobs", &payload)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Payload Too Large" }));
    assert_eq!(app.lifecycle.build_stats().await.jobs_processed, 0);
}

#[tokio::test]
async fn unknown_routes_and_methods_are_not_found() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not Found" }));

    let (status, _) = app.send(get("/jobs")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.backend.heartbeat_calls(), 0);
}

#[tokio::test]
async fn forwarded_headers_drive_registered_endpoint() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/healthz")
        .header("host", "10.0.0.5:3100")
        .header("x-forwarded-host", "monitor.example, proxy.internal")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();

    app.send(request).await;
    assert_eq!(app.backend.registrations()[0].endpoint, "https://monitor.example");
}
