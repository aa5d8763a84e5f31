use std::time::Duration;

use async_trait::async_trait;
use monitor_errors::{MonitorError, MonitorResult};
use tracing::{debug, info, warn};

use crate::models::{HeartbeatPayload, RegistrationRequest};

pub const REGISTER_PATH: &str = "/workers/register";
pub const HEARTBEAT_PATH: &str = "/hooks/heartbeat";

/// The monitoring backend as seen from the worker.
#[async_trait]
pub trait MonitoringBackend: Send + Sync {
    async fn register(&self, request: &RegistrationRequest) -> MonitorResult<()>;
    async fn send_heartbeat(&self, payload: &HeartbeatPayload) -> MonitorResult<()>;
}

pub struct HttpBackendClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> MonitorResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| MonitorError::config_error(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: serde::Serialize + Sync>(
        &self,
        operation: &str,
        path: &str,
        body: &T,
    ) -> MonitorResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http_client.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!("{} rejected by backend: HTTP {} - {}", operation, status, body);
        Err(MonitorError::backend(operation, status.as_u16(), body))
    }
}

#[async_trait]
impl MonitoringBackend for HttpBackendClient {
    async fn register(&self, request: &RegistrationRequest) -> MonitorResult<()> {
        self.post_json("Registration", REGISTER_PATH, request).await?;
        info!(
            "Registered worker {} with backend via {}",
            request.id, request.endpoint
        );
        Ok(())
    }

    async fn send_heartbeat(&self, payload: &HeartbeatPayload) -> MonitorResult<()> {
        self.post_json("Heartbeat", HEARTBEAT_PATH, payload).await?;
        debug!("Heartbeat sent successfully for worker {}", payload.worker.id);
        Ok(())
    }
}
