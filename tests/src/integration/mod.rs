//! Cross-subsystem integration scenarios.

pub mod command_relay;
pub mod gateway_flow;
pub mod verification_flow;
