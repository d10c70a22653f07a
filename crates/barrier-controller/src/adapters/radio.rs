//! # Radio Link Variants
//!
//! Two modem modes exist in the field: FSK and LoRa. Each is its own
//! [`RadioLink`] implementation carrying its modem parameters; the variant
//! is chosen once at construction from [`RadioMode`] and the rest of the
//! system never branches on it again.
//!
//! The SPI transceiver driver itself is out of scope: it feeds received
//! frames into the link through an mpsc channel, which also makes the link
//! trivially drivable from tests.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::ports::{RadioFrame, RadioLink};

/// Which modem the transceiver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioMode {
    /// Frequency-shift keying.
    #[default]
    Fsk,
    /// LoRa.
    Lora,
}

/// FSK modem parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FskParams {
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Transmit power in dBm.
    pub tx_power_dbm: i8,
    /// Fixed payload length the modem is configured for.
    pub payload_len: u8,
}

impl Default for FskParams {
    fn default() -> Self {
        Self {
            frequency_mhz: 868.2,
            tx_power_dbm: 0,
            payload_len: 64,
        }
    }
}

/// LoRa modem parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoraParams {
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Transmit power in dBm.
    pub tx_power_dbm: i8,
    /// Node address on the LoRa network.
    pub node_address: u8,
}

impl Default for LoraParams {
    fn default() -> Self {
        Self {
            frequency_mhz: 868.0,
            tx_power_dbm: 14,
            node_address: 1,
        }
    }
}

/// Radio section of the controller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Modem variant to construct.
    pub mode: RadioMode,
    /// FSK parameters (used when `mode = "fsk"`).
    pub fsk: FskParams,
    /// LoRa parameters (used when `mode = "lora"`).
    pub lora: LoraParams,
}

/// FSK variant of the radio link.
pub struct FskLink {
    params: FskParams,
    frames: mpsc::Receiver<RadioFrame>,
}

impl FskLink {
    /// Construct over a driver frame channel.
    #[must_use]
    pub fn new(params: FskParams, frames: mpsc::Receiver<RadioFrame>) -> Self {
        debug!(
            frequency_mhz = params.frequency_mhz,
            tx_power_dbm = params.tx_power_dbm,
            "FSK link up"
        );
        Self { params, frames }
    }

    /// The modem parameters this link was brought up with.
    #[must_use]
    pub fn params(&self) -> &FskParams {
        &self.params
    }
}

#[async_trait::async_trait]
impl RadioLink for FskLink {
    async fn recv(&mut self) -> Option<RadioFrame> {
        self.frames.recv().await
    }

    fn mode_name(&self) -> &'static str {
        "fsk"
    }
}

/// LoRa variant of the radio link.
pub struct LoraLink {
    params: LoraParams,
    frames: mpsc::Receiver<RadioFrame>,
}

impl LoraLink {
    /// Construct over a driver frame channel.
    #[must_use]
    pub fn new(params: LoraParams, frames: mpsc::Receiver<RadioFrame>) -> Self {
        debug!(
            frequency_mhz = params.frequency_mhz,
            node_address = params.node_address,
            "LoRa link up"
        );
        Self { params, frames }
    }

    /// The modem parameters this link was brought up with.
    #[must_use]
    pub fn params(&self) -> &LoraParams {
        &self.params
    }
}

#[async_trait::async_trait]
impl RadioLink for LoraLink {
    async fn recv(&mut self) -> Option<RadioFrame> {
        self.frames.recv().await
    }

    fn mode_name(&self) -> &'static str {
        "lora"
    }
}

/// Construct the configured link variant over a driver frame channel.
#[must_use]
pub fn build_link(config: &RadioConfig, frames: mpsc::Receiver<RadioFrame>) -> Box<dyn RadioLink> {
    match config.mode {
        RadioMode::Fsk => Box::new(FskLink::new(config.fsk.clone(), frames)),
        RadioMode::Lora => Box::new(LoraLink::new(config.lora.clone(), frames)),
    }
}
