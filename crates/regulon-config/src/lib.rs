//! Configuration loading for Regulon.
//! Reads regulon.toml from the current directory or the path in the
//! REGULON_CONFIG env var. Every field has a default so an empty file
//! (or no file at all) yields a working local configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url()        -> String { "http://localhost:8080/api".to_string() }
fn default_request_timeout() -> u64 { 30 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between workflow reconciliation cycles.
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// How long to wait for the remote service to confirm a cancellation
    /// before reporting a cancellation timeout.
    #[serde(default = "default_cancel_timeout")]
    pub cancel_timeout_secs: u64,
    /// Interval between status checks while awaiting cancel confirmation.
    #[serde(default = "default_confirm_interval")]
    pub confirm_interval_secs: u64,
}

fn default_poll_interval()    -> u64 { 10 }
fn default_cancel_timeout()   -> u64 { 30 }
fn default_confirm_interval() -> u64 { 1 }

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            cancel_timeout_secs: default_cancel_timeout(),
            confirm_interval_secs: default_confirm_interval(),
        }
    }
}

impl Config {
    /// Load from the path in REGULON_CONFIG, falling back to ./regulon.toml,
    /// falling back to defaults when neither exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("REGULON_CONFIG").unwrap_or_else(|_| "regulon.toml".to_string());
        if Path::new(&path).exists() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    pub fn cancel_timeout(&self) -> Duration {
        Duration::from_secs(self.polling.cancel_timeout_secs)
    }

    pub fn confirm_interval(&self) -> Duration {
        Duration::from_secs(self.polling.confirm_interval_secs)
    }
}
