//! # Barrier Controller
//!
//! The barrier-side runtime: receives radio frames and relays them to the
//! authority for verification, serves the per-barrier command endpoints the
//! authority relays into, and reports every event upstream.
//!
//! The controller performs no permission checks of its own — the
//! authorization boundary is entirely on the authority side. Commands
//! arriving here carry the caller identity the authority attached, used for
//! event attribution only.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod gateway;
pub mod http;
pub mod ports;

// Re-exports for the runtime and test suites
pub use adapters::authority::{HttpAuthorityClient, HttpEventSink};
pub use adapters::radio::{build_link, FskLink, FskParams, LoraLink, LoraParams, RadioConfig, RadioMode};
pub use config::ControllerConfig;
pub use gateway::RadioSignalGateway;
pub use http::router;
pub use ports::{AuthorityClient, AuthorityClientError, RadioFrame, RadioLink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
