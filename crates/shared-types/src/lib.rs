//! # Shared Types
//!
//! Core domain types shared across the gatelink subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `BarrierId`, `PrincipalId`, `CredentialId`
//! - **Authorization**: `PermissionLevel`, `BarrierAction`
//! - **Events**: `BarrierEvent`, `EventType`, `TriggerMethod`, `EventSink`
//! - **API payloads**: verification and command request/response bodies

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod entities;
pub mod events;
pub mod serde_util;

// Re-exports
pub use api::{CommandResponse, StatusResponse, VerifyRemoteRequest, VerifyRemoteResponse};
pub use entities::{BarrierAction, BarrierId, CredentialId, PermissionLevel, PrincipalId};
pub use events::{
    BarrierEvent, EventSink, EventType, MemoryEventSink, TracingEventSink, TriggerMethod,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
