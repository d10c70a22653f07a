//! # Gatelink Test Suite
//!
//! Unified test crate for cross-subsystem scenarios:
//!
//! ```text
//! tests/src/integration/
//! ├── verification_flow.rs   # frame → verify → replay guard, end to end
//! ├── command_relay.rs       # authority permission check + relay
//! └── gateway_flow.rs        # radio frame → authority → actuator open
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gatelink-tests
//! cargo test -p gatelink-tests integration::verification_flow
//! ```

#[cfg(test)]
pub mod integration;
