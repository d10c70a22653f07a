//! # Message Authentication
//!
//! HMAC-SHA256 tags over remote credential ciphertexts (encrypt-then-MAC).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Byte length of an HMAC-SHA256 tag.
pub const MAC_LEN: usize = 32;

/// HMAC-SHA256 key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct MacKey([u8; 32]);

impl MacKey {
    /// Byte length of a MAC key.
    pub const LEN: usize = 32;

    /// Create from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: Self::LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Generate a random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for MacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MacKey(..)")
    }
}

/// Compute the HMAC-SHA256 tag of `data` under `key`.
#[must_use]
pub fn mac_tag(key: &MacKey, data: &[u8]) -> [u8; MAC_LEN] {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verify `tag` against `data` under `key`.
///
/// The comparison is constant-time, so a tag mismatch leaks nothing about
/// how many tag bytes matched.
#[must_use]
pub fn verify_tag(key: &MacKey, data: &[u8], tag: &[u8]) -> bool {
    let mut mac = match HmacSha256::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_verifies() {
        let key = MacKey::generate();
        let tag = mac_tag(&key, b"ciphertext bytes");
        assert!(verify_tag(&key, b"ciphertext bytes", &tag));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let key1 = MacKey::generate();
        let key2 = MacKey::generate();
        let tag = mac_tag(&key1, b"ciphertext bytes");
        assert!(!verify_tag(&key2, b"ciphertext bytes", &tag));
    }

    #[test]
    fn test_any_flipped_tag_bit_rejected() {
        let key = MacKey::generate();
        let mut tag = mac_tag(&key, b"payload");
        tag[7] ^= 0x01;
        assert!(!verify_tag(&key, b"payload", &tag));
    }

    #[test]
    fn test_truncated_tag_rejected() {
        let key = MacKey::generate();
        let tag = mac_tag(&key, b"payload");
        assert!(!verify_tag(&key, b"payload", &tag[..16]));
    }

    #[test]
    fn test_tag_is_deterministic() {
        let key = MacKey::from_bytes([0xB8; 32]);
        let tag1 = mac_tag(&key, b"fixed data");
        let tag2 = mac_tag(&key, b"fixed data");
        assert_eq!(tag1, tag2);
        assert_eq!(tag1.len(), MAC_LEN);
    }
}
