//! # Frame Verification
//!
//! Wire format of a remote frame, raw bytes:
//!
//! ```text
//! [ciphertext][32-byte HMAC-SHA256 tag]
//! ```
//!
//! where the ciphertext, once the AES-128-CTR keystream is removed, yields
//!
//! ```text
//! [8-byte credential id][8-byte big-endian counter][optional command bytes]
//! ```
//!
//! Verification is a pure function over the frame and the candidate set: it
//! never mutates a credential record. Because the frame carries no cleartext
//! credential id, each frame costs one MAC check per candidate until a match
//! is found — O(credentials registered to the barrier). No upper bound or
//! caching strategy is imposed here; deployments with large candidate sets
//! should treat this as a scalability consideration.

use shared_crypto::{apply_keystream, mac_tag, verify_tag, MAC_LEN};
use shared_types::CredentialId;

use crate::domain::entities::{CredentialRecord, FrameAcceptance};
use crate::domain::errors::VerifyError;

/// Minimum decrypted payload: 8-byte id + 8-byte counter.
pub const PAYLOAD_MIN_LEN: usize = CredentialId::LEN + 8;

/// Minimum total frame: minimum payload + MAC tag.
pub const FRAME_MIN_LEN: usize = PAYLOAD_MIN_LEN + MAC_LEN;

/// Find the (at most one) candidate whose keys authenticate and decrypt
/// `frame`, and extract its embedded anti-replay counter.
///
/// Candidates are tried in the order supplied; no ordering is assumed or
/// required. If none matches, the most specific failure observed across all
/// attempts is returned, defaulting to
/// [`VerifyError::NoMatchingCredential`] when no candidate was attempted.
pub fn verify_frame<'a>(
    frame: &[u8],
    candidates: &'a [CredentialRecord],
) -> Result<FrameAcceptance<'a>, VerifyError> {
    if frame.len() < FRAME_MIN_LEN {
        return Err(VerifyError::MessageTooShort { len: frame.len() });
    }

    let (ciphertext, tag) = frame.split_at(frame.len() - MAC_LEN);

    let mut failure = VerifyError::NoMatchingCredential;
    for candidate in candidates {
        match try_candidate(ciphertext, tag, candidate) {
            Ok(counter) => {
                return Ok(FrameAcceptance {
                    record: candidate,
                    counter,
                })
            }
            Err(err) => failure = failure.most_specific(err),
        }
    }
    Err(failure)
}

/// Trial one candidate: authenticate, decrypt, check the embedded id, parse
/// the counter.
fn try_candidate(
    ciphertext: &[u8],
    tag: &[u8],
    candidate: &CredentialRecord,
) -> Result<u64, VerifyError> {
    // The tag covers the ciphertext, so tampering with either fails here
    // before any decryption work.
    if !verify_tag(&candidate.mac_key, ciphertext, tag) {
        return Err(VerifyError::MacMismatch);
    }

    let mut plaintext = ciphertext.to_vec();
    apply_keystream(&candidate.cipher_key, &candidate.counter_seed, &mut plaintext);

    if plaintext.len() < PAYLOAD_MIN_LEN {
        return Err(VerifyError::DecryptionError);
    }

    // A MAC match with a foreign embedded id should not occur when keys are
    // unique; checked anyway so a collision can never mis-attribute access.
    if plaintext[..CredentialId::LEN] != candidate.id.0 {
        return Err(VerifyError::IdMismatch);
    }

    let counter_bytes: [u8; 8] = plaintext[CredentialId::LEN..PAYLOAD_MIN_LEN]
        .try_into()
        .map_err(|_| VerifyError::DecodeError)?;
    Ok(u64::from_be_bytes(counter_bytes))
}

/// Build a frame the way an issued remote does: encrypt
/// `[id][counter][command]` under the credential's keystream and append the
/// HMAC tag over the ciphertext.
///
/// Used by provisioning simulators and the test suites; the production
/// counterpart runs on the remote's firmware.
#[must_use]
pub fn seal_frame(record: &CredentialRecord, counter: u64, command: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(PAYLOAD_MIN_LEN + command.len());
    payload.extend_from_slice(record.id.as_bytes());
    payload.extend_from_slice(&counter.to_be_bytes());
    payload.extend_from_slice(command);

    apply_keystream(&record.cipher_key, &record.counter_seed, &mut payload);
    let tag = mac_tag(&record.mac_key, &payload);

    payload.extend_from_slice(&tag);
    payload
}
