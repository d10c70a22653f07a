//! Authority configuration with validation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Authority process configuration, loaded from a TOML file with defaults
/// for everything absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// HTTP listen address.
    pub listen: SocketAddr,
    /// Timeout for one relayed controller command.
    #[serde(with = "shared_types::serde_util::duration")]
    pub command_timeout: Duration,
    /// Provisioning file seeding the in-memory directory (barriers,
    /// permission grants, issued credentials).
    pub directory_path: Option<PathBuf>,
    /// Cap on `GET /api/events` page sizes.
    pub max_event_limit: usize,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5001".parse().expect("static listen address"),
            command_timeout: Duration::from_secs(15),
            directory_path: None,
            max_event_limit: 1000,
        }
    }
}

impl AuthorityConfig {
    /// Load from a TOML file, or fall back to defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
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
        if self.command_timeout.is_zero() {
            return Err(ConfigError::Invalid("command_timeout cannot be 0".into()));
        }
        if self.max_event_limit == 0 {
            return Err(ConfigError::Invalid("max_event_limit cannot be 0".into()));
        }
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
