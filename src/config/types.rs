//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::storage::StorageConfig;

/// Config file used when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "acwarden.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
    /// Policy store backend.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Outbound notification delivery.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file named on the command line, or the default file.
    ///
    /// A missing default file yields built-in defaults. A missing explicit
    /// file is an error.
    pub fn load_or_default(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// HTTP listen address.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Serve Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            listen: default_listen(),
            metrics: true,
        }
    }
}

/// Webhook delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
    /// User-Agent header sent with each delivery.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_webhook_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_server_name() -> String {
    "acwarden".to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_true() -> bool {
    true
}

fn default_webhook_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    concat!("acwarden/", env!("CARGO_PKG_VERSION")).to_string()
}
