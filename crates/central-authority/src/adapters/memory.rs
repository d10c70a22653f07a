//! In-memory directory and event store.
//!
//! Stands in for the excluded persistent storage layer. The directory can be
//! seeded from a TOML provisioning file carrying the same artifacts the
//! credential generator emits: barrier registrations, permission grants, and
//! issued credentials with hex-encoded key material.

use std::collections::HashMap;
use std::path::Path;

use credential_verification::{CredentialDirectory, CredentialRecord, DirectoryError};
use parking_lot::Mutex;
use serde::Deserialize;
use shared_crypto::{CipherKey, CounterSeed, MacKey};
use shared_types::{BarrierEvent, BarrierId, CredentialId, PermissionLevel, PrincipalId};
use tracing::info;

use crate::ports::outbound::{Directory, EventStore, StoreError};

/// In-memory implementation of [`Directory`] and the credential store.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    barriers: Mutex<HashMap<BarrierId, String>>,
    permissions: Mutex<HashMap<(PrincipalId, BarrierId), PermissionLevel>>,
    credentials: Mutex<Vec<CredentialRecord>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a barrier and its controller endpoint.
    pub fn register_barrier(&self, barrier: BarrierId, endpoint: impl Into<String>) {
        self.barriers.lock().insert(barrier, endpoint.into());
    }

    /// Grant `level` to `principal` on `barrier`. A second grant for the
    /// same pair replaces the first, keeping the one-grant-per-pair rule.
    pub fn grant(&self, principal: PrincipalId, barrier: BarrierId, level: PermissionLevel) {
        self.permissions.lock().insert((principal, barrier), level);
    }

    /// Add an issued credential record.
    pub fn issue_credential(&self, record: CredentialRecord) {
        self.credentials.lock().push(record);
    }

    /// Load a provisioning file.
    pub fn from_provision_file(path: &Path) -> Result<Self, ProvisionError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProvisionError::Io(path.display().to_string(), e.to_string()))?;
        let file: ProvisionFile =
            toml::from_str(&content).map_err(|e| ProvisionError::Parse(e.to_string()))?;

        let directory = Self::new();
        for barrier in file.barriers {
            directory.register_barrier(BarrierId::new(&barrier.id), barrier.endpoint);
        }
        for grant in file.permissions {
            directory.grant(
                PrincipalId::new(&grant.principal),
                BarrierId::new(&grant.barrier),
                grant.level,
            );
        }
        for cred in file.credentials {
            directory.issue_credential(cred.into_record()?);
        }

        info!(
            barriers = directory.barriers.lock().len(),
            grants = directory.permissions.lock().len(),
            credentials = directory.credentials.lock().len(),
            "directory provisioned"
        );
        Ok(directory)
    }
}

#[async_trait::async_trait]
impl Directory for MemoryDirectory {
    async fn permission_level(
        &self,
        principal: &PrincipalId,
        barrier: &BarrierId,
    ) -> Result<Option<PermissionLevel>, StoreError> {
        Ok(self
            .permissions
            .lock()
            .get(&(principal.clone(), barrier.clone()))
            .copied())
    }

    async fn controller_endpoint(&self, barrier: &BarrierId) -> Result<Option<String>, StoreError> {
        Ok(self.barriers.lock().get(barrier).cloned())
    }
}

#[async_trait::async_trait]
impl CredentialDirectory for MemoryDirectory {
    async fn credentials_for(
        &self,
        barrier: &BarrierId,
    ) -> Result<Vec<CredentialRecord>, DirectoryError> {
        Ok(self
            .credentials
            .lock()
            .iter()
            .filter(|record| &record.barrier == barrier)
            .cloned()
            .collect())
    }

    async fn advance_counter(
        &self,
        credential: CredentialId,
        counter: u64,
    ) -> Result<(), DirectoryError> {
        let mut credentials = self.credentials.lock();
        if let Some(record) = credentials.iter_mut().find(|r| r.id == credential) {
            if counter > record.last_accepted_counter {
                record.last_accepted_counter = counter;
            }
        }
        Ok(())
    }
}

/// In-memory append-only [`EventStore`].
#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<BarrierEvent>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: BarrierEvent) -> Result<(), StoreError> {
        self.events.lock().push(event);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<BarrierEvent>, StoreError> {
        Ok(self
            .events
            .lock()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Errors loading a provisioning file.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Could not read the file.
    #[error("cannot read provisioning file {0}: {1}")]
    Io(String, String),
    /// Could not parse the file.
    #[error("cannot parse provisioning file: {0}")]
    Parse(String),
    /// A hex field had the wrong length or encoding.
    #[error("invalid field '{field}' for credential {credential}: {message}")]
    BadField {
        /// Field name in the file.
        field: &'static str,
        /// Credential id (hex) the field belongs to.
        credential: String,
        /// What went wrong.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ProvisionFile {
    #[serde(default)]
    barriers: Vec<BarrierEntry>,
    #[serde(default)]
    permissions: Vec<PermissionEntry>,
    #[serde(default)]
    credentials: Vec<CredentialEntry>,
}

#[derive(Debug, Deserialize)]
struct BarrierEntry {
    id: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct PermissionEntry {
    principal: String,
    barrier: String,
    level: PermissionLevel,
}

#[derive(Debug, Deserialize)]
struct CredentialEntry {
    id: String,
    principal: String,
    barrier: String,
    cipher_key: String,
    mac_key: String,
    counter_seed: String,
    #[serde(default)]
    last_accepted_counter: u64,
}

impl CredentialEntry {
    fn into_record(self) -> Result<CredentialRecord, ProvisionError> {
        let bad = |field: &'static str, message: String| ProvisionError::BadField {
            field,
            credential: self.id.clone(),
            message,
        };

        let id = CredentialId::from_hex(&self.id)
            .map_err(|e| bad("id", e.to_string()))?;
        let cipher_key = hex::decode(&self.cipher_key)
            .map_err(|e| bad("cipher_key", e.to_string()))
            .and_then(|bytes| {
                CipherKey::from_slice(&bytes).map_err(|e| bad("cipher_key", e.to_string()))
            })?;
        let mac_key = hex::decode(&self.mac_key)
            .map_err(|e| bad("mac_key", e.to_string()))
            .and_then(|bytes| {
                MacKey::from_slice(&bytes).map_err(|e| bad("mac_key", e.to_string()))
            })?;
        let counter_seed = hex::decode(&self.counter_seed)
            .map_err(|e| bad("counter_seed", e.to_string()))
            .and_then(|bytes| {
                CounterSeed::from_slice(&bytes).map_err(|e| bad("counter_seed", e.to_string()))
            })?;

        Ok(CredentialRecord {
            id,
            principal: PrincipalId::new(&self.principal),
            barrier: BarrierId::new(&self.barrier),
            cipher_key,
            mac_key,
            counter_seed,
            last_accepted_counter: self.last_accepted_counter,
        })
    }
}
