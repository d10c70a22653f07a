//! # Ports: the radio capability and the authority client
//!
//! The transceiver driver is an external collaborator: the core places no
//! constraints on frames beyond "a byte sequence" and consumes them through
//! [`RadioLink`] alone.

use shared_types::{BarrierId, VerifyRemoteResponse};
use thiserror::Error;

/// One received radio frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioFrame {
    /// Raw frame bytes as delivered by the transceiver.
    pub bytes: Vec<u8>,
    /// Received signal strength, when the modem reports one.
    pub rssi: Option<i16>,
}

impl RadioFrame {
    /// Frame from raw bytes with no signal metadata.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, rssi: None }
    }
}

/// Receive side of the radio capability.
///
/// Two variant implementations exist (FSK and LoRa), selected at
/// construction time; the gateway depends only on this trait.
#[async_trait::async_trait]
pub trait RadioLink: Send + Sync {
    /// Next received frame, or `None` once the link is closed.
    async fn recv(&mut self) -> Option<RadioFrame>;

    /// Human-readable modem mode, for logs.
    fn mode_name(&self) -> &'static str;
}

/// Errors talking to the authority's verification endpoint.
#[derive(Debug, Error)]
pub enum AuthorityClientError {
    /// No verification endpoint is configured; frames cannot be verified.
    #[error("verification disabled: no authority verify endpoint configured")]
    Disabled,

    /// The request did not complete within the timeout.
    #[error("verification request timed out")]
    Timeout,

    /// The endpoint could not be reached or answered a non-success status.
    #[error("verification transport failed: {0}")]
    Transport(String),

    /// The endpoint answered something that is not a verification response.
    #[error("malformed verification response: {0}")]
    Malformed(String),
}

/// Client for the authority's frame-verification endpoint.
#[async_trait::async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Submit a hex-encoded frame received at `barrier` for verification.
    async fn verify_remote(
        &self,
        barrier: &BarrierId,
        frame_hex: &str,
    ) -> Result<VerifyRemoteResponse, AuthorityClientError>;
}
