//! Actuator configuration with validation.
//!
//! Defaults mirror the deployed installation: 5 s travel up, 10 s monitored
//! travel down, three close attempts with a 10 s pause, a 50 cm obstacle
//! threshold and a 10 s auto-close delay.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and sensing parameters of one barrier mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Physical travel time of the open sequence.
    #[serde(with = "shared_types::serde_util::duration")]
    pub open_duration: Duration,
    /// Monitored travel time of one close attempt.
    #[serde(with = "shared_types::serde_util::duration")]
    pub close_duration: Duration,
    /// Pause between failed close attempts.
    #[serde(with = "shared_types::serde_util::duration")]
    pub retry_delay: Duration,
    /// Maximum close attempts before the terminal failure.
    pub max_close_attempts: u32,
    /// Readings strictly below this distance count as an obstacle.
    pub distance_threshold_cm: f64,
    /// Distance-capability polling cadence while closing.
    #[serde(with = "shared_types::serde_util::duration")]
    pub poll_interval: Duration,
    /// Delay before an unattended open barrier closes itself.
    #[serde(with = "shared_types::serde_util::duration")]
    pub auto_close_delay: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            open_duration: Duration::from_secs(5),
            close_duration: Duration::from_secs(10),
            retry_delay: Duration::from_secs(10),
            max_close_attempts: 3,
            distance_threshold_cm: 50.0,
            poll_interval: Duration::from_millis(100),
            auto_close_delay: Duration::from_secs(10),
        }
    }
}

impl ActuatorConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_close_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_close_attempts cannot be 0".into(),
            ));
        }
        if self.close_duration.is_zero() {
            return Err(ConfigError::Invalid("close_duration cannot be 0".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll_interval cannot be 0".into()));
        }
        if !(self.distance_threshold_cm > 0.0) {
            return Err(ConfigError::Invalid(
                "distance_threshold_cm must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// General configuration error
    #[error("invalid actuator configuration: {0}")]
    Invalid(String),
}
