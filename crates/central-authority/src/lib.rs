//! # Central Authority
//!
//! The authority side of the access-control system: verifies radio
//! credentials for its barriers, maps (caller, action) to allow/deny against
//! stored permission grants, and relays allowed commands to the barrier
//! controllers while preserving caller identity.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     CENTRAL AUTHORITY                      │
//! ├───────────────────────────────────────────────────────────┤
//! │  HTTP (axum)                                               │
//! │   POST /api/verify/remote          radio verification      │
//! │   POST /api/barriers/:id/<action>  permissioned relay      │
//! │   POST /barrier/event              event intake            │
//! │   GET  /api/events                 event readback          │
//! ├──────────────────────┬────────────────────────────────────┤
//! │  AuthorityService    │  credential-verification service    │
//! ├──────────────────────┴────────────────────────────────────┤
//! │  Ports: Directory · EventStore · ControllerGateway         │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The authorization boundary lives entirely here: controllers execute
//! whatever arrives on their command surface, attributing it to the caller
//! identity the authority forwards.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod http;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use adapters::gateway::HttpControllerGateway;
pub use adapters::memory::{MemoryDirectory, MemoryEventStore, ProvisionError};
pub use domain::authorize::authorize;
pub use domain::config::AuthorityConfig;
pub use domain::errors::{AuthzError, RelayError, RelayOutcome};
pub use http::router;
pub use ports::outbound::{ControllerGateway, Directory, EventStore, StoreError};
pub use service::AuthorityService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
