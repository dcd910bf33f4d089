//! Agent configuration.
//!
//! Values come from an optional TOML file, then CLI flags or environment
//! variables override them (see `main.rs`).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::agent::MeanDwell;
use crate::error::ConfigError;
use crate::tasks::DEFAULT_MAX_OUTPUT_BYTES;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_SERVICE: &str = "5000";
const DEFAULT_SCHEME: &str = "http";
const DEFAULT_PATH: &str = "/results";
const DEFAULT_MEAN_DWELL_SECS: f64 = 1.0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for one agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Control endpoint host.
    pub host: String,
    /// Control endpoint service (port).
    pub service: String,
    /// URL scheme for the HTTP transport.
    pub scheme: String,
    /// Request path on the control endpoint.
    pub path: String,
    /// Initial mean dwell between check-ins, in seconds.
    pub mean_dwell: f64,
    /// Round-trip timeout in seconds. Zero disables the timeout.
    pub request_timeout_secs: u64,
    /// Cap on captured command output, in bytes.
    pub max_output_bytes: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            path: DEFAULT_PATH.to_string(),
            mean_dwell: DEFAULT_MEAN_DWELL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl AgentConfig {
    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    /// Check that the settings can drive an agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "host".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.service.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "service".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "scheme".to_string(),
                message: format!("unsupported scheme '{}'", self.scheme),
            });
        }
        MeanDwell::new(self.mean_dwell)?;
        Ok(())
    }

    /// Round-trip timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}
