//! # Authority Error Taxonomy
//!
//! Authorization failures are rejected locally; relay failures surface the
//! transport problem as a distinct reason. Controller-reported business
//! failures are *not* errors here: they travel back verbatim inside
//! [`RelayOutcome`].

use serde_json::Value;
use shared_types::{BarrierAction, PermissionLevel};
use thiserror::Error;

/// Why a caller was not allowed to request an action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthzError {
    /// No grant exists for the (principal, barrier) pair.
    #[error("no permission for this barrier")]
    NoPermission,

    /// A grant exists but its level does not cover the action.
    #[error("permission level '{level}' insufficient for action '{action}'")]
    InsufficientLevel {
        /// The caller's grant level.
        level: PermissionLevel,
        /// The requested action.
        action: BarrierAction,
    },
}

impl AuthzError {
    /// Stable reason string for events and API responses.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoPermission => "no_permission",
            Self::InsufficientLevel { .. } => "insufficient_level",
        }
    }
}

/// The controller's response, propagated to the caller verbatim.
///
/// Both success and controller-reported failure travel through here: the
/// authority does not reinterpret a `busy` or a 409 from the controller as
/// its own error.
#[derive(Debug, Clone)]
pub struct RelayOutcome {
    /// HTTP status the controller returned.
    pub status: u16,
    /// Body the controller returned (JSON, or `{"raw_response": ...}`).
    pub body: Value,
}

/// Why a relay did not produce a controller response.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Rejected before any network traffic.
    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    /// No controller endpoint is registered for the barrier.
    #[error("no controller endpoint configured for barrier")]
    UnknownBarrier,

    /// The controller did not answer within the command timeout.
    #[error("timeout waiting for barrier controller")]
    GatewayTimeout,

    /// The controller could not be reached.
    #[error("connection to barrier controller failed: {0}")]
    GatewayConnection(String),

    /// The permission/barrier directory could not be queried.
    #[error("directory unavailable: {0}")]
    Store(String),
}

impl RelayError {
    /// Stable reason string for events and API responses.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized(e) => e.reason(),
            Self::UnknownBarrier => "unknown_barrier",
            Self::GatewayTimeout => "gateway_timeout",
            Self::GatewayConnection(_) => "gateway_connection",
            Self::Store(_) => "directory_error",
        }
    }

    /// HTTP status the authority answers with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 403,
            Self::UnknownBarrier => 404,
            Self::GatewayTimeout => 504,
            Self::GatewayConnection(_) => 502,
            Self::Store(_) => 500,
        }
    }
}
