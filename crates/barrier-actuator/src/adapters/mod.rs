//! In-process adapters for the hardware capability ports.

pub mod lamp;
pub mod sensor;
