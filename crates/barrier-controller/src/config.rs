//! Controller configuration with validation.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use barrier_actuator::ActuatorConfig;
use serde::{Deserialize, Serialize};

use crate::adapters::radio::RadioConfig;

/// Controller process configuration, loaded from a TOML file with defaults
/// for everything absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Unique id of the barrier this controller drives.
    pub barrier_id: String,
    /// HTTP listen address for the command endpoints.
    pub listen: SocketAddr,
    /// Central authority endpoints.
    pub authority: AuthorityEndpoints,
    /// Actuator timings and sensing.
    pub actuator: ActuatorConfig,
    /// Radio modem selection and parameters.
    pub radio: RadioConfig,
}

/// Where the central authority lives. Either URL may be absent: event
/// reporting and radio verification then run disabled, loudly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityEndpoints {
    /// Event intake endpoint (`POST /barrier/event`).
    pub event_url: Option<String>,
    /// Frame verification endpoint (`POST /api/verify/remote`).
    pub verify_url: Option<String>,
    /// Timeout for one request to the authority.
    #[serde(with = "shared_types::serde_util::duration")]
    pub request_timeout: Duration,
}

impl Default for AuthorityEndpoints {
    fn default() -> Self {
        Self {
            event_url: None,
            verify_url: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            barrier_id: "gate-01".to_string(),
            listen: "0.0.0.0:5000".parse().expect("static listen address"),
            authority: AuthorityEndpoints::default(),
            actuator: ActuatorConfig::default(),
            radio: RadioConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Load from a TOML file, or fall back to defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.barrier_id.trim().is_empty() {
            return Err(ConfigError::Invalid("barrier_id cannot be empty".into()));
        }
        if self.authority.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "authority.request_timeout cannot be 0".into(),
            ));
        }
        self.actuator
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the file.
    #[error("cannot read config {0}: {1}")]
    Io(String, String),
    /// Could not parse the file.
    #[error("cannot parse config: {0}")]
    Parse(String),
    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
