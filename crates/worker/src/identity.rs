use monitor_config::AppConfig;
use serde::Serialize;

/// Who this worker is. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerIdentity {
    pub id: String,
    pub name: String,
    pub geo: String,
    pub capabilities: Vec<String>,
    pub backend_base_url: String,
    pub heartbeat_interval_ms: i64,
    pub static_endpoint: String,
}

impl WorkerIdentity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        geo: impl Into<String>,
        backend_base_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geo: geo.into(),
            capabilities: Vec::new(),
            backend_base_url: backend_base_url.into().trim_end_matches('/').to_string(),
            heartbeat_interval_ms: 0,
            static_endpoint: String::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.worker.id.clone(),
            config.worker.name.clone(),
            config.worker.geo.clone(),
            config.backend.base_url.clone(),
        )
        .with_capabilities(config.worker.capabilities.iter().cloned())
        .with_heartbeat_interval_ms(config.worker.heartbeat_interval_ms)
        .with_static_endpoint(config.worker.endpoint.clone())
    }

    /// Capabilities form a set; duplicates are dropped keeping first-seen order.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.clear();
        for capability in capabilities {
            let capability = capability.into();
            if !self.capabilities.contains(&capability) {
                self.capabilities.push(capability);
            }
        }
        self
    }

    pub fn with_heartbeat_interval_ms(mut self, interval_ms: i64) -> Self {
        self.heartbeat_interval_ms = interval_ms;
        self
    }

    pub fn with_static_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.static_endpoint = endpoint.into();
        self
    }

    pub fn static_endpoint(&self) -> Option<&str> {
        Some(self.static_endpoint.as_str()).filter(|endpoint| !endpoint.is_empty())
    }
}
