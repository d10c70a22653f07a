//! Actuator state flags and status snapshots.

use serde::{Deserialize, Serialize};

/// Mutable actuator flags, guarded by the service's state mutex.
///
/// Invariants:
/// - `in_motion` is true only during an active travel phase and is cleared
///   on every exit path by the phase guard that set it
/// - while `in_motion` is true no other transition may start
/// - `service_mode` suspends the auto-close timer
/// - a failed close leaves `is_open` true: the actuator never claims closed
///   unless a full close sequence completed without interruption
#[derive(Debug, Default)]
pub(crate) struct ActuatorState {
    pub is_open: bool,
    pub in_motion: bool,
    pub stop_requested: bool,
    pub service_mode: bool,
    pub auto_close_armed: bool,
}

/// Coarse barrier position derived from the state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierPosition {
    /// Fully lowered.
    Closed,
    /// Fully raised.
    Open,
    /// A transition is in progress.
    Moving,
}

impl BarrierPosition {
    /// Wire label used on the status endpoint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Moving => "moving",
        }
    }
}

/// Consistent point-in-time view of the actuator, taken under the state
/// lock. Cheap enough for status endpoints to call while a movement runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Whether the barrier is raised.
    pub is_open: bool,
    /// Whether a travel phase is active right now.
    pub in_motion: bool,
    /// Whether the maintenance override is on.
    pub service_mode: bool,
}

impl StateSnapshot {
    /// Coarse position for display.
    #[must_use]
    pub fn position(&self) -> BarrierPosition {
        if self.in_motion {
            BarrierPosition::Moving
        } else if self.is_open {
            BarrierPosition::Open
        } else {
            BarrierPosition::Closed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_derivation() {
        let snap = StateSnapshot {
            is_open: true,
            in_motion: true,
            service_mode: false,
        };
        assert_eq!(snap.position(), BarrierPosition::Moving);

        let snap = StateSnapshot {
            is_open: true,
            in_motion: false,
            service_mode: false,
        };
        assert_eq!(snap.position(), BarrierPosition::Open);

        let snap = StateSnapshot {
            is_open: false,
            in_motion: false,
            service_mode: true,
        };
        assert_eq!(snap.position(), BarrierPosition::Closed);
    }

    #[test]
    fn test_position_labels() {
        assert_eq!(BarrierPosition::Moving.as_str(), "moving");
        assert_eq!(BarrierPosition::Open.as_str(), "open");
        assert_eq!(BarrierPosition::Closed.as_str(), "closed");
    }
}
