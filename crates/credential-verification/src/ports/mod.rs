//! Ports layer: trait definitions for the credential store dependency.

pub mod outbound;
