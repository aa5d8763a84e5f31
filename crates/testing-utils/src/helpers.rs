//! Test helper utilities

use std::time::Duration;

use monitor_worker::WorkerIdentity;
use tokio::time::sleep;

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Wait for a condition to be true with timeout
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }

        condition().await
    }

    /// Identity used across tests; heartbeat loop disabled unless overridden.
    pub fn identity(backend_base_url: &str) -> WorkerIdentity {
        WorkerIdentity::new("worker-test", "Test Worker", "EU", backend_base_url)
            .with_capabilities(["http-monitoring"])
    }
}
