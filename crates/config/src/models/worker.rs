use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKER_ID: &str = "worker-cloudflare";
pub const DEFAULT_WORKER_NAME: &str = "Worker Cloudflare";
pub const DEFAULT_WORKER_GEO: &str = "AWS";
pub const DEFAULT_BACKEND_URL: &str = "https://tizbin-worker-1.loca.lt/external-monitoring";
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: i64 = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub id: String,
    pub name: String,
    pub geo: String,
    pub capabilities: Vec<String>,
    /// Zero or negative disables the background heartbeat loop.
    pub heartbeat_interval_ms: i64,
    /// Externally advertised endpoint; empty when it must come from request headers.
    #[serde(default)]
    pub endpoint: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_WORKER_ID.to_string(),
            name: DEFAULT_WORKER_NAME.to_string(),
            geo: DEFAULT_WORKER_GEO.to_string(),
            capabilities: vec!["http-monitoring".to_string()],
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            endpoint: String::new(),
        }
    }
}

impl ConfigValidator for WorkerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.id, "worker.id")?;
        ValidationUtils::validate_not_empty(&self.name, "worker.name")?;

        if self.capabilities.is_empty() {
            return Err(crate::ConfigError::Validation(
                "worker.capabilities cannot be empty".to_string(),
            ));
        }
        for capability in &self.capabilities {
            ValidationUtils::validate_not_empty(capability, "worker.capabilities")?;
        }

        if !self.endpoint.is_empty() {
            ValidationUtils::validate_http_url(&self.endpoint, "worker.endpoint")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl ConfigValidator for BackendConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_http_url(&self.base_url, "backend.base_url")?;
        ValidationUtils::validate_timeout_ms(self.request_timeout_ms, "backend.request_timeout_ms")?;
        Ok(())
    }
}
