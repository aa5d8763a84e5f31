use std::time::Duration;

use chrono::{TimeZone, Utc};
use monitor_errors::MonitorError;
use monitor_testing_utils::{MockBackendServer, TestEnv};
use monitor_worker::{
    HeartbeatPayload, HttpBackendClient, MonitoringBackend, RegistrationRequest,
};
use serde_json::json;

fn client_for(base_url: &str, timeout: Duration) -> HttpBackendClient {
    HttpBackendClient::new(base_url, timeout).unwrap()
}

#[tokio::test]
async fn registration_posts_expected_body() {
    let server = MockBackendServer::spawn().await;
    let client = client_for(&format!("{}/", server.base_url), Duration::from_secs(5));
    assert_eq!(client.base_url(), server.base_url);
    let identity = TestEnv::identity(&server.base_url);

    client
        .register(&RegistrationRequest::new(&identity, "https://w.example"))
        .await
        .unwrap();

    assert_eq!(
        server.registrations(),
        vec![json!({
            "id": "worker-test",
            "name": "Test Worker",
            "geo": "EU",
            "endpoint": "https://w.example",
            "capabilities": ["http-monitoring"],
        })]
    );
}

#[tokio::test]
async fn heartbeat_posts_expected_body() {
    let server = MockBackendServer::spawn().await;
    let client = client_for(&server.base_url, Duration::from_secs(5));
    let identity = TestEnv::identity(&server.base_url);
    let at = Utc.with_ymd_and_hms(2025, 11, 9, 14, 23, 39).unwrap();

    client
        .send_heartbeat(&HeartbeatPayload::new(&identity, Some("warming up".into()), at))
        .await
        .unwrap();

    assert_eq!(
        server.heartbeats(),
        vec![json!({
            "worker": { "id": "worker-test", "name": "Test Worker", "geo": "EU" },
            "stats": {
                "pendingJobs": 0,
                "bufferedResults": 0,
                "inFlight": 0,
                "lastResultAt": null,
                "notes": "warming up",
            },
            "timestamp": "2025-11-09T14:23:39.000Z",
        })]
    );
}

#[tokio::test]
async fn rejected_registration_carries_status_and_body() {
    let server = MockBackendServer::spawn().await;
    server.set_register_status(409);
    let client = client_for(&server.base_url, Duration::from_secs(5));
    let identity = TestEnv::identity(&server.base_url);

    let err = client
        .register(&RegistrationRequest::new(&identity, "https://w.example"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, MonitorError::Backend { status: 409, .. }),
        "got {err:?}"
    );
    assert_eq!(err.to_string(), "Registration failed (409): registration rejected");
}

#[tokio::test]
async fn rejected_heartbeat_carries_status_and_body() {
    let server = MockBackendServer::spawn().await;
    server.set_heartbeat_status(503);
    let client = client_for(&server.base_url, Duration::from_secs(5));
    let identity = TestEnv::identity(&server.base_url);

    let err = client
        .send_heartbeat(&HeartbeatPayload::new(&identity, None, Utc::now()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Heartbeat failed (503): heartbeat rejected");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockBackendServer::spawn().await;
    server.set_response_delay(Some(Duration::from_millis(500)));
    let client = client_for(&server.base_url, Duration::from_millis(50));
    let identity = TestEnv::identity(&server.base_url);

    let err = client
        .send_heartbeat(&HeartbeatPayload::new(&identity, None, Utc::now()))
        .await
        .unwrap_err();

    assert!(matches!(err, MonitorError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base_url = format!("http://{addr}");
    let client = client_for(&base_url, Duration::from_secs(2));
    let identity = TestEnv::identity(&base_url);

    let err = client
        .register(&RegistrationRequest::new(&identity, "https://w.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, MonitorError::Network(_)), "got {err:?}");
}
