//! # API Payloads
//!
//! Request/response bodies exchanged between the controller and the central
//! authority. These correspond to the HTTP surfaces in the authority and
//! controller crates.

use serde::{Deserialize, Serialize};

use crate::entities::{BarrierId, PrincipalId};

/// Radio-frame verification request submitted by a controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRemoteRequest {
    /// The barrier the frame was received at.
    pub barrier_id: BarrierId,
    /// Hex-encoded `[ciphertext][32-byte MAC]` frame.
    pub frame_hex: String,
}

/// Outcome of a radio-frame verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRemoteResponse {
    /// Whether the frame authenticated and passed replay protection.
    pub access_granted: bool,
    /// Stable failure reason when access was denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Principal owning the accepted credential, for event attribution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<PrincipalId>,
}

impl VerifyRemoteResponse {
    /// Access granted for `principal`.
    #[must_use]
    pub fn granted(principal: PrincipalId) -> Self {
        Self {
            access_granted: true,
            reason: None,
            principal: Some(principal),
        }
    }

    /// Access denied with a stable reason string.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            access_granted: false,
            reason: Some(reason.into()),
            principal: None,
        }
    }
}

/// Status/message body returned by the controller command endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// `"ok"` or `"error"`.
    pub status: String,
    /// Human-readable description of what the controller did.
    pub message: String,
}

impl CommandResponse {
    /// An `"ok"` response.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    /// An `"error"` response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Body of the controller `GET /status` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `"open"`, `"closed"` or `"moving"`.
    pub barrier_status: String,
    /// Whether the maintenance override is active.
    pub service_mode: bool,
}
