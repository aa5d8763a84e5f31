use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderValue};
use monitor_testing_utils::{MockBackend, TestEnv};
use monitor_worker::{WorkerLifecycle, WORKER_ROUTES};
use serde_json::json;

fn lifecycle_with(backend: &MockBackend, interval_ms: i64) -> WorkerLifecycle {
    let identity = TestEnv::identity("http://backend/external-monitoring")
        .with_heartbeat_interval_ms(interval_ms);
    WorkerLifecycle::new(identity, Arc::new(backend.clone()))
}

async fn heartbeats_reach(backend: &MockBackend, expected: usize) -> bool {
    let backend = backend.clone();
    TestEnv::wait_for(
        move || {
            let backend = backend.clone();
            async move { backend.heartbeat_calls() >= expected }
        },
        Duration::from_secs(2),
    )
    .await
}

#[tokio::test]
async fn prepare_request_registers_then_heartbeats_with_resolved_endpoint() {
    let backend = MockBackend::new();
    let lifecycle = lifecycle_with(&backend, 0);

    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-host", HeaderValue::from_static("edge.example"));
    headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

    let endpoint = lifecycle.prepare_request(&headers, false).await;
    assert_eq!(endpoint, "https://edge.example");

    assert_eq!(backend.registrations()[0].endpoint, "https://edge.example");
    assert_eq!(backend.heartbeat_calls(), 1);

    let stats = lifecycle.build_stats().await;
    assert!(stats.last_registration_at.is_some());
    assert!(stats.last_heartbeat_at.is_some());

    lifecycle.prepare_request(&headers, false).await;
    assert_eq!(backend.registration_calls(), 1);
    assert_eq!(backend.heartbeat_calls(), 2);
}

#[tokio::test]
async fn prepare_request_without_any_endpoint_still_heartbeats() {
    let backend = MockBackend::new();
    let lifecycle = lifecycle_with(&backend, 0);

    let endpoint = lifecycle.prepare_request(&HeaderMap::new(), false).await;
    assert_eq!(endpoint, "");
    assert_eq!(backend.registration_calls(), 0);
    assert_eq!(backend.heartbeat_calls(), 1);
}

#[tokio::test]
async fn backend_outage_keeps_health_but_reports_error() {
    let backend = MockBackend::new();
    backend.fail_registrations(1, 500, "db down");
    backend.set_heartbeat_failure(Some((500, "db down")));
    let lifecycle = lifecycle_with(&backend, 0);

    let mut headers = HeaderMap::new();
    headers.insert("host", HeaderValue::from_static("w.example"));
    lifecycle.prepare_request(&headers, false).await;

    let report = lifecycle.status_report().await;
    assert_eq!(report.stats.last_error.as_deref(), Some("Heartbeat failed (500): db down"));
    assert_eq!(report.stats.last_heartbeat_at, None);
    assert!(lifecycle.health().ok);

    // The heartbeat carried the registration failure as its note.
    assert_eq!(
        backend.heartbeats()[0].stats.notes.as_deref(),
        Some("Registration failed (500): db down")
    );
}

#[tokio::test]
async fn status_report_and_listings_reflect_identity() {
    let backend = MockBackend::new();
    let lifecycle = lifecycle_with(&backend, 0);

    lifecycle.handle_jobs(Some(&json!({ "jobs": [1, 2, 3] }))).await;

    let report = lifecycle.status_report().await;
    assert_eq!(report.worker.id, "worker-test");
    assert_eq!(report.worker.backend_url, "http://backend/external-monitoring");
    assert_eq!(report.stats.jobs_processed, 3);

    let health = lifecycle.health();
    assert_eq!(health.worker_id, "worker-test");

    let listing = lifecycle.route_listing();
    assert!(listing.ok);
    assert_eq!(listing.routes, WORKER_ROUTES.map(String::from).to_vec());
}

#[tokio::test]
async fn scheduler_is_disabled_for_non_positive_interval() {
    let backend = MockBackend::new();
    for interval in [0, -5] {
        let lifecycle = lifecycle_with(&backend, interval);
        assert!(!lifecycle.start_scheduler(Some("https://w.example".to_string())).await);
        assert!(!lifecycle.is_running().await);
    }
}

#[tokio::test]
async fn scheduler_ticks_register_and_heartbeat_until_stopped() {
    let backend = MockBackend::new();
    let lifecycle = lifecycle_with(&backend, 20);

    assert!(lifecycle.start_scheduler(Some("https://w.example".to_string())).await);
    assert!(!lifecycle.start_scheduler(Some("https://w.example".to_string())).await);
    assert!(lifecycle.is_running().await);

    assert!(heartbeats_reach(&backend, 3).await);
    assert_eq!(backend.registration_calls(), 1);

    lifecycle.stop().await;
    assert!(!lifecycle.is_running().await);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let after_stop = backend.heartbeat_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.heartbeat_calls(), after_stop);
}

#[tokio::test]
async fn scheduler_survives_backend_failures() {
    let backend = MockBackend::new();
    backend.fail_registrations(2, 503, "unavailable");
    backend.set_heartbeat_failure(Some((503, "unavailable")));
    let lifecycle = lifecycle_with(&backend, 20);

    lifecycle.start_scheduler(Some("https://w.example".to_string())).await;
    assert!(heartbeats_reach(&backend, 3).await);
    assert!(backend.registration_calls() >= 3);
    assert!(lifecycle.is_running().await);
    assert!(lifecycle.registration().is_registered().await);

    backend.set_heartbeat_failure(None);
    let seen = backend.heartbeat_calls();
    assert!(heartbeats_reach(&backend, seen + 1).await);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(lifecycle.build_stats().await.last_error, None);

    lifecycle.stop().await;
}

#[tokio::test]
async fn startup_sequence_registers_heartbeats_and_starts_loop() {
    let backend = MockBackend::new();
    let lifecycle = lifecycle_with(&backend, 60_000);

    lifecycle.start("http://localhost:3100".to_string()).await;

    assert_eq!(backend.registrations()[0].endpoint, "http://localhost:3100");
    assert_eq!(backend.heartbeat_calls(), 1);
    assert!(lifecycle.is_running().await);

    lifecycle.stop().await;
    assert!(!lifecycle.is_running().await);
}
