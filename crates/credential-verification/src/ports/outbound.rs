//! # Outbound Ports (Driven Ports / SPI)
//!
//! The credential store is supplied by the excluded storage layer; this
//! subsystem only reads records and writes back advanced counters.

use shared_types::{BarrierId, CredentialId};
use thiserror::Error;

use crate::domain::entities::CredentialRecord;

/// Error from credential store operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The store could not be reached or queried.
    #[error("credential directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-mostly access to issued credential records.
#[async_trait::async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// All credential records issued for `barrier`.
    async fn credentials_for(
        &self,
        barrier: &BarrierId,
    ) -> Result<Vec<CredentialRecord>, DirectoryError>;

    /// Persist an advanced anti-replay counter after a successful
    /// verification. The stored value never decreases.
    async fn advance_counter(
        &self,
        credential: CredentialId,
        counter: u64,
    ) -> Result<(), DirectoryError>;
}
