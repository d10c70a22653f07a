//! # Credential Verification Subsystem
//!
//! Verifies encrypted radio frames against the credential records issued for
//! a barrier and enforces the per-credential anti-replay counter.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure frame verification, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for the credential store
//! - **Service Layer** (`service.rs`): Wires domain logic, replay guard, and
//!   the store together
//!
//! ## Security Notes
//!
//! - **Encrypt-then-MAC**: the HMAC-SHA256 tag covers the ciphertext, so
//!   tampering is rejected before any decryption happens
//! - **Trial verification**: the frame carries no cleartext credential id, so
//!   cost is O(credentials registered to the barrier) per frame; see
//!   [`domain::frame`] for the scalability note
//! - **Strict replay rule**: a counter equal to the last accepted value is a
//!   replay; only strictly greater counters pass

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod replay;
pub mod service;

// Re-export public API
pub use domain::entities::{CredentialRecord, VerifiedFrame};
pub use domain::errors::VerifyError;
pub use domain::frame::{seal_frame, verify_frame, FRAME_MIN_LEN, PAYLOAD_MIN_LEN};
pub use ports::outbound::{CredentialDirectory, DirectoryError};
pub use replay::ReplayGuard;
pub use service::VerificationService;
