//! # Replay Guard
//!
//! Owns the per-credential high-water mark of accepted anti-replay counters
//! and atomically tests-and-advances it.
//!
//! ## Concurrency
//!
//! Two concurrent verifications for the same credential must observe a
//! linear, non-decreasing sequence of accepted counters: the second caller
//! sees the first caller's advance. One guard-wide mutex over the
//! high-water map serialises every accept; at the record counts a single
//! barrier sees, per-record locks would buy nothing.

use std::collections::HashMap;

use parking_lot::Mutex;
use shared_types::CredentialId;

use crate::domain::entities::CredentialRecord;
use crate::domain::errors::VerifyError;

/// Per-credential monotonic counter enforcement.
#[derive(Debug, Default)]
pub struct ReplayGuard {
    high_water: Mutex<HashMap<CredentialId, u64>>,
}

impl ReplayGuard {
    /// Create an empty guard. High-water entries are seeded lazily from the
    /// stored record the first time a credential is seen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `counter` for `record` iff it is strictly greater than the
    /// last accepted value; advance the mark before reporting success.
    ///
    /// Equal counters are replays. The in-memory mark is reconciled with the
    /// stored record via `max`, so a stale store read can never regress the
    /// guard below a counter it already accepted.
    pub fn accept(&self, record: &CredentialRecord, counter: u64) -> Result<(), VerifyError> {
        let mut marks = self.high_water.lock();
        let mark = marks
            .entry(record.id)
            .or_insert(record.last_accepted_counter);
        if record.last_accepted_counter > *mark {
            *mark = record.last_accepted_counter;
        }

        if counter <= *mark {
            return Err(VerifyError::StaleCounter {
                counter,
                last_accepted: *mark,
            });
        }

        *mark = counter;
        Ok(())
    }

    /// Current high-water mark for a credential, if it has been seen.
    #[must_use]
    pub fn last_accepted(&self, credential: &CredentialId) -> Option<u64> {
        self.high_water.lock().get(credential).copied()
    }
}
