//! # Outbound Ports (Driven Ports / SPI)
//!
//! Account, barrier, and permission storage is an external collaborator;
//! the authority only issues the read queries below and appends events.

use shared_types::{BarrierAction, BarrierEvent, BarrierId, PermissionLevel, PrincipalId};
use thiserror::Error;

use crate::domain::errors::{RelayError, RelayOutcome};

/// Error from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or queried.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only directory of barriers and permission grants.
#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    /// Permission level granted to `principal` on `barrier`, if any. At most
    /// one grant exists per pair.
    async fn permission_level(
        &self,
        principal: &PrincipalId,
        barrier: &BarrierId,
    ) -> Result<Option<PermissionLevel>, StoreError>;

    /// Network endpoint of the barrier's controller, if registered.
    async fn controller_endpoint(&self, barrier: &BarrierId) -> Result<Option<String>, StoreError>;
}

/// Append-only event store (the EventRecorder collaborator).
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Append one event record.
    async fn append(&self, event: BarrierEvent) -> Result<(), StoreError>;

    /// Most recent `limit` events, newest first. Serves the operator
    /// readback endpoint; the core never consumes these itself.
    async fn recent(&self, limit: usize) -> Result<Vec<BarrierEvent>, StoreError>;
}

/// Transport to one barrier controller's command surface.
#[async_trait::async_trait]
pub trait ControllerGateway: Send + Sync {
    /// POST `action` to the controller at `endpoint`, carrying the caller's
    /// identity; return the controller's status and body verbatim.
    async fn send(
        &self,
        endpoint: &str,
        action: BarrierAction,
        principal: &PrincipalId,
    ) -> Result<RelayOutcome, RelayError>;
}
