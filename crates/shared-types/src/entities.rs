//! # Core Domain Entities
//!
//! Identity and authorization types shared by the authority and the
//! barrier-side controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier of one physical barrier installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarrierId(pub String);

impl BarrierId {
    /// Create a barrier id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BarrierId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A human operator or a credential identity attributable to an action.
///
/// Used for authorization decisions and for event attribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Create a principal id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque 8-byte identifier of an issued remote credential.
///
/// Serialized as lowercase hex on every wire and storage surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialId(pub [u8; 8]);

impl CredentialId {
    /// Byte length of a credential id.
    pub const LEN: usize = 8;

    /// Create from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Parse from a 16-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// The raw id bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for CredentialId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for CredentialId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Permission level of a (principal, barrier) grant.
///
/// At most one grant exists per (principal, barrier) pair; the level decides
/// which [`BarrierAction`]s the principal may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// May open and close the barrier.
    Operator,
    /// May additionally start and end service mode.
    Technician,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => f.write_str("operator"),
            Self::Technician => f.write_str("technician"),
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = UnknownPermissionLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operator" => Ok(Self::Operator),
            "technician" => Ok(Self::Technician),
            other => Err(UnknownPermissionLevel(other.to_string())),
        }
    }
}

/// Error returned when parsing an unknown permission level string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown permission level: {0}")]
pub struct UnknownPermissionLevel(pub String);

/// An action requested against one barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierAction {
    /// Raise the barrier.
    Open,
    /// Lower the barrier.
    Close,
    /// Enter the maintenance override.
    ServiceStart,
    /// Leave the maintenance override.
    ServiceEnd,
}

impl BarrierAction {
    /// URL path segment used on the controller command surface.
    #[must_use]
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::ServiceStart => "service/start",
            Self::ServiceEnd => "service/end",
        }
    }

    /// Minimum permission level required to request this action.
    #[must_use]
    pub fn required_level(&self) -> PermissionLevel {
        match self {
            Self::Open | Self::Close => PermissionLevel::Operator,
            Self::ServiceStart | Self::ServiceEnd => PermissionLevel::Technician,
        }
    }
}

impl fmt::Display for BarrierAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}
