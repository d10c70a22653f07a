//! # Verification Service
//!
//! Application service wiring the pure frame verifier, the replay guard, and
//! the credential store together. This is what the authority's verification
//! endpoint calls.
//!
//! Failures never unwind past this boundary: every rejection becomes a typed
//! [`VerifyError`] with a stable reason string.

use std::sync::Arc;

use shared_types::BarrierId;
use tracing::{debug, info, warn};

use crate::domain::entities::VerifiedFrame;
use crate::domain::errors::VerifyError;
use crate::domain::frame::verify_frame;
use crate::ports::outbound::CredentialDirectory;
use crate::replay::ReplayGuard;

/// Credential verification service.
pub struct VerificationService {
    directory: Arc<dyn CredentialDirectory>,
    guard: ReplayGuard,
}

impl VerificationService {
    /// Create a new verification service over a credential store.
    pub fn new(directory: Arc<dyn CredentialDirectory>) -> Self {
        Self {
            directory,
            guard: ReplayGuard::new(),
        }
    }

    /// Verify one hex-encoded frame received at `barrier`.
    ///
    /// Steps: decode, trial-verify against every credential issued for the
    /// barrier, enforce the strict anti-replay rule, persist the advanced
    /// counter. The persisted write happens after the guard accepted, so a
    /// concurrent duplicate can never be accepted twice.
    pub async fn verify_remote(
        &self,
        barrier: &BarrierId,
        frame_hex: &str,
    ) -> Result<VerifiedFrame, VerifyError> {
        let frame = hex::decode(frame_hex.trim()).map_err(|_| VerifyError::DecodeError)?;

        let candidates = self
            .directory
            .credentials_for(barrier)
            .await
            .map_err(|e| VerifyError::Directory(e.to_string()))?;
        debug!(
            barrier = %barrier,
            candidates = candidates.len(),
            frame_len = frame.len(),
            "verifying remote frame"
        );

        let accepted = verify_frame(&frame, &candidates)?;
        self.guard.accept(accepted.record, accepted.counter)?;

        let verified = accepted.into_verified();
        if let Err(e) = self
            .directory
            .advance_counter(verified.credential_id, verified.counter)
            .await
        {
            // The in-memory guard already advanced, so replay protection
            // holds for this process; only durability is degraded.
            warn!(
                credential = %verified.credential_id,
                counter = verified.counter,
                error = %e,
                "failed to persist advanced counter"
            );
        }

        info!(
            barrier = %barrier,
            credential = %verified.credential_id,
            principal = %verified.principal,
            counter = verified.counter,
            "remote frame verified"
        );
        Ok(verified)
    }
}
