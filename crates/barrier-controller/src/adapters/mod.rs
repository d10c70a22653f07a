//! Adapters: radio link variants and the HTTP authority client.

pub mod authority;
pub mod radio;
