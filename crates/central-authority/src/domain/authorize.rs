//! # Command Authorization
//!
//! Maps (caller's grant level, requested action) to allow/deny. Pure; runs
//! before any network relay so an unauthorized caller never reaches a
//! controller.

use shared_types::{BarrierAction, PermissionLevel};

use crate::domain::errors::AuthzError;

/// Decide whether a caller holding `level` (or no grant at all) may request
/// `action`.
///
/// `open`/`close` need `operator` or `technician`; `service/start` and
/// `service/end` need `technician`.
pub fn authorize(
    level: Option<PermissionLevel>,
    action: BarrierAction,
) -> Result<PermissionLevel, AuthzError> {
    let level = level.ok_or(AuthzError::NoPermission)?;

    let sufficient = match action.required_level() {
        PermissionLevel::Operator => true, // every grant level may operate
        PermissionLevel::Technician => level == PermissionLevel::Technician,
    };

    if sufficient {
        Ok(level)
    } else {
        Err(AuthzError::InsufficientLevel { level, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_may_open_and_close() {
        for action in [BarrierAction::Open, BarrierAction::Close] {
            assert!(authorize(Some(PermissionLevel::Operator), action).is_ok());
        }
    }

    #[test]
    fn test_operator_may_not_touch_service_mode() {
        for action in [BarrierAction::ServiceStart, BarrierAction::ServiceEnd] {
            let err = authorize(Some(PermissionLevel::Operator), action).unwrap_err();
            assert_eq!(err.reason(), "insufficient_level");
        }
    }

    #[test]
    fn test_technician_may_do_everything() {
        for action in [
            BarrierAction::Open,
            BarrierAction::Close,
            BarrierAction::ServiceStart,
            BarrierAction::ServiceEnd,
        ] {
            assert!(authorize(Some(PermissionLevel::Technician), action).is_ok());
        }
    }

    #[test]
    fn test_no_grant_is_rejected() {
        let err = authorize(None, BarrierAction::Open).unwrap_err();
        assert_eq!(err.reason(), "no_permission");
    }
}
