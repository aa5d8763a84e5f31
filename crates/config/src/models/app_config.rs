use config::{Config as ConfigBuilder, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    observability::ObservabilityConfig,
    server::ServerConfig,
    worker::{BackendConfig, WorkerConfig},
};
use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub worker: WorkerConfig,
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Loads defaults, then the optional TOML file, then the process environment.
    pub fn load(config_path: Option<&str>) -> ConfigResult<Self> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup.
    ///
    /// Empty variables count as unset. The backend URL, worker id and
    /// capability list are fixed per deployment and never read from the
    /// environment.
    pub fn load_with_env<F>(config_path: Option<&str>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ConfigBuilder::builder().add_source(ConfigBuilder::try_from(&Self::default())?);

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(ConfigError::File(format!("配置文件不存在: {path}")));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let first_of = |keys: &[&'static str]| {
            keys.iter().find_map(|key| lookup(key).map(|value| (*key, value)))
        };

        builder = builder
            .set_override_option("worker.name", lookup("WORKER_NAME"))?
            .set_override_option("worker.geo", lookup("WORKER_GEO"))?
            .set_override_option(
                "worker.endpoint",
                first_of(&["WORKER_ENDPOINT", "PUBLIC_ENDPOINT"]).map(|(_, v)| v),
            )?;

        if let Some(raw) = lookup("HEARTBEAT_INTERVAL") {
            let interval = parse_env_number::<i64>("HEARTBEAT_INTERVAL", &raw)?;
            builder = builder.set_override("worker.heartbeat_interval_ms", interval)?;
        }
        if let Some((key, raw)) = first_of(&["PORT", "WORKER_PORT"]) {
            let port = parse_env_number::<u16>(key, &raw)?;
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse::<T>().map_err(|_| {
        ConfigError::Environment(format!("{key} must be a number, got '{raw}'"))
    })
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.worker.validate()?;
        self.backend.validate()?;
        self.server.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
