//! # Credential Entities

use shared_crypto::{CipherKey, CounterSeed, MacKey};
use shared_types::{BarrierId, CredentialId, PrincipalId};

/// One issued remote credential.
///
/// Created by provisioning, read-only to the verification path except for
/// `last_accepted_counter`, which only the replay guard advances, and only
/// after a successful verification.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Opaque 8-byte identifier embedded in every frame.
    pub id: CredentialId,
    /// The principal this credential is attributed to.
    pub principal: PrincipalId,
    /// The single barrier this credential may open.
    pub barrier: BarrierId,
    /// AES-128 key for the payload keystream.
    pub cipher_key: CipherKey,
    /// HMAC-SHA256 key authenticating the ciphertext.
    pub mac_key: MacKey,
    /// Initial CTR counter value (the credential's IV).
    pub counter_seed: CounterSeed,
    /// High-water mark of accepted anti-replay counters. Never decreases.
    pub last_accepted_counter: u64,
}

/// Outcome of a successful verification: which credential matched and the
/// counter it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedFrame {
    /// The matching credential.
    pub credential_id: CredentialId,
    /// Principal owning the credential, for event attribution.
    pub principal: PrincipalId,
    /// The embedded anti-replay counter.
    pub counter: u64,
}

/// A candidate that authenticated and decrypted a frame, borrowed from the
/// candidate set so the caller can run the replay check against it.
#[derive(Debug)]
pub struct FrameAcceptance<'a> {
    /// The matching credential record.
    pub record: &'a CredentialRecord,
    /// The embedded anti-replay counter.
    pub counter: u64,
}

impl FrameAcceptance<'_> {
    /// Detach into an owned [`VerifiedFrame`].
    #[must_use]
    pub fn into_verified(self) -> VerifiedFrame {
        VerifiedFrame {
            credential_id: self.record.id,
            principal: self.record.principal.clone(),
            counter: self.counter,
        }
    }
}
