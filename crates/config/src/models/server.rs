use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which HTTP substrate serves the worker routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Axum,
    Hyper,
}

impl FromStr for Transport {
    type Err = crate::ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "axum" => Ok(Transport::Axum),
            "hyper" | "raw" => Ok(Transport::Hyper),
            other => Err(crate::ConfigError::Validation(format!(
                "Invalid transport: {other}. Valid options: axum, hyper"
            ))),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Axum => write!(f, "axum"),
            Transport::Hyper => write!(f, "hyper"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    #[serde(default)]
    pub transport: Transport,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            max_body_bytes: 256 * 1024,
            transport: Transport::Axum,
        }
    }
}

impl ConfigValidator for ServerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.host, "server.host")?;
        // Port 0 asks the OS for an ephemeral port.
        if self.max_body_bytes == 0 {
            return Err(crate::ConfigError::Validation(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
