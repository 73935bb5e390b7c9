//! Configuration loading for the agent and the app topology.
//!
//! Two JSON documents drive the agent: the agent configuration (check
//! interval, file paths, HTTP timeout) and the app topology mapping each
//! host to its ordered probe targets. Both keep the camelCase field names
//! of the on-disk format.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default agent configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Minimum allowed health-check interval (1 second).
pub const MIN_INTERVAL_SECS: u64 = 1;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON configuration.
    #[error("failed to parse JSON config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// When the agent configuration is re-read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Re-read the configuration file before every cycle (default).
    #[default]
    Always,
    /// Read the configuration file once at startup only.
    Startup,
}

/// A single probe target within a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    /// Report label; also the key into the metrics store.
    pub domain: String,
    /// Path appended to the host to form the probe URL.
    pub health_endpoint: String,
}

/// Hosts mapped to their ordered probe targets.
///
/// Loaded fresh each cycle and read-only while the cycle runs.
pub type Topology = HashMap<String, Vec<App>>;

/// Top-level agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Seconds between health-check cycles (minimum 1).
    pub health_check_interval: u64,

    /// Path to the app-topology JSON file.
    pub apps_config_path: String,

    /// Path the report is written to each cycle.
    pub output_file_path: String,

    /// HTTP client timeout in seconds (minimum 1).
    pub http_client_timeout: u64,

    /// Configuration reload policy (default: always).
    #[serde(default)]
    pub reload_policy: ReloadPolicy,
}

impl AgentConfig {
    /// Load and validate the agent configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.health_check_interval < MIN_INTERVAL_SECS {
            return Err(ConfigError::Validation(format!(
                "healthCheckInterval must be at least {} second(s)",
                MIN_INTERVAL_SECS
            )));
        }

        if self.http_client_timeout == 0 {
            return Err(ConfigError::Validation(
                "httpClientTimeout must be positive".to_string(),
            ));
        }

        if self.apps_config_path.is_empty() {
            return Err(ConfigError::Validation(
                "appsConfigPath must not be empty".to_string(),
            ));
        }

        if self.output_file_path.is_empty() {
            return Err(ConfigError::Validation(
                "outputFilePath must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Interval between cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval)
    }

    /// Per-request HTTP client timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_client_timeout)
    }
}

/// Load the app topology from a JSON file.
///
/// The per-host app order is preserved; hosts themselves carry no order.
///
/// # Errors
/// Returns `ConfigError` if the file cannot be read or parsed. Callers
/// treat this as a skip-this-cycle condition, not a fatal one.
pub fn load_topology(path: impl AsRef<Path>) -> Result<Topology, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}
