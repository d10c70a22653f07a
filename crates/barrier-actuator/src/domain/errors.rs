//! Actuator error taxonomy.
//!
//! Obstacles during a close are recovered attempt-by-attempt inside the
//! retry loop and never surface here; only the terminal outcomes do.

use thiserror::Error;

/// Why an actuator command was rejected or failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActuatorError {
    /// A transition is already in progress; nothing was changed.
    #[error("transition already in progress")]
    Busy,

    /// Every allowed close attempt failed; the barrier remains open and
    /// needs operator intervention.
    #[error("close failed after {attempts} attempts, barrier remains open")]
    AttemptsExhausted {
        /// How many attempts were made.
        attempts: u32,
    },

    /// An external stop request aborted the close; no further retries.
    #[error("close aborted by stop request")]
    Stopped,

    /// Service mode cannot end while the barrier is moving.
    #[error("cannot end service mode while barrier is in motion")]
    MotionInProgress,

    /// The actuator configuration failed validation at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ActuatorError {
    /// Stable reason string for events and API responses.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Busy => "busy",
            Self::AttemptsExhausted { .. } => "attempts_exhausted",
            Self::Stopped => "stopped",
            Self::MotionInProgress => "motion_in_progress",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(ActuatorError::Busy.reason(), "busy");
        assert_eq!(
            ActuatorError::AttemptsExhausted { attempts: 3 }.reason(),
            "attempts_exhausted"
        );
        assert_eq!(ActuatorError::Stopped.reason(), "stopped");
    }
}
