//! Ports layer: dependencies supplied by the storage layer and the network.

pub mod outbound;
