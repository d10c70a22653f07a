//! # Verification Errors
//!
//! Every rejection carries a stable snake_case reason string suitable for
//! access-denied events and API responses. None of these are fatal to the
//! service.

use thiserror::Error;

/// Why a frame was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// Frame shorter than the minimum payload + MAC length.
    #[error("message too short: {len} bytes")]
    MessageTooShort {
        /// Received frame length in bytes.
        len: usize,
    },

    /// The wire data could not be decoded (bad hex, malformed counter bytes).
    #[error("frame decode error")]
    DecodeError,

    /// The HMAC tag did not match the ciphertext for any candidate.
    #[error("mac mismatch")]
    MacMismatch,

    /// The ciphertext decrypted to a payload shorter than id + counter.
    #[error("decryption error")]
    DecryptionError,

    /// The embedded credential id did not match the candidate that
    /// authenticated the frame (possible only under a MAC collision).
    #[error("embedded credential id mismatch")]
    IdMismatch,

    /// The embedded counter was not strictly greater than the last accepted
    /// value for the credential.
    #[error("stale counter {counter} (last accepted {last_accepted})")]
    StaleCounter {
        /// Counter carried by the frame.
        counter: u64,
        /// Current high-water mark for the credential.
        last_accepted: u64,
    },

    /// No candidate credential authenticated the frame.
    #[error("no matching credential")]
    NoMatchingCredential,

    /// The credential store could not be queried.
    #[error("credential directory unavailable: {0}")]
    Directory(String),
}

impl VerifyError {
    /// Stable reason string for events and API responses.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MessageTooShort { .. } => "message_too_short",
            Self::DecodeError => "decode_error",
            Self::MacMismatch => "mac_mismatch",
            Self::DecryptionError => "decryption_error",
            Self::IdMismatch => "id_mismatch",
            Self::StaleCounter { .. } => "stale_counter",
            Self::NoMatchingCredential => "no_matching_credential",
            Self::Directory(_) => "directory_error",
        }
    }

    /// How far through the candidate trial this failure got. Higher means the
    /// candidate progressed further before being rejected, so the reason is
    /// more specific when reporting across a whole candidate set.
    #[must_use]
    pub(crate) fn specificity(&self) -> u8 {
        match self {
            Self::NoMatchingCredential => 0,
            Self::MessageTooShort { .. } => 1,
            Self::MacMismatch => 2,
            Self::DecryptionError => 3,
            Self::IdMismatch => 4,
            Self::DecodeError => 5,
            Self::StaleCounter { .. } | Self::Directory(_) => 6,
        }
    }

    /// Keep the more specific of two failures.
    #[must_use]
    pub(crate) fn most_specific(self, other: Self) -> Self {
        if other.specificity() > self.specificity() {
            other
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings_are_stable() {
        assert_eq!(VerifyError::MacMismatch.reason(), "mac_mismatch");
        assert_eq!(
            VerifyError::StaleCounter {
                counter: 1,
                last_accepted: 1
            }
            .reason(),
            "stale_counter"
        );
        assert_eq!(
            VerifyError::MessageTooShort { len: 3 }.reason(),
            "message_too_short"
        );
    }

    #[test]
    fn test_most_specific_prefers_deeper_failure() {
        let a = VerifyError::MacMismatch;
        let b = VerifyError::IdMismatch;
        assert_eq!(a.clone().most_specific(b.clone()), b);
        assert_eq!(b.clone().most_specific(a), b);
    }
}
