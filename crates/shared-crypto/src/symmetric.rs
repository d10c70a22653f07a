//! # Symmetric Encryption
//!
//! AES-128-CTR keystream application for remote credential payloads.
//!
//! The counter block is the full 128 bits, initialized from the credential's
//! counter seed interpreted as a big-endian integer and incremented
//! big-endian. Applying the keystream twice with the same key and seed is the
//! identity, so encryption and decryption share one function.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use zeroize::Zeroize;

use crate::CryptoError;

type Aes128CtrBE = ctr::Ctr128BE<Aes128>;

/// AES-128 cipher key (128-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct CipherKey([u8; 16]);

impl CipherKey {
    /// Byte length of a cipher key.
    pub const LEN: usize = 16;

    /// Create from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; 16] = bytes
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
        let mut bytes = [0u8; 16];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.write_str("CipherKey(..)")
    }
}

/// Initial counter value for the CTR keystream (the credential's IV).
#[derive(Clone, PartialEq, Eq)]
pub struct CounterSeed([u8; 16]);

impl CounterSeed {
    /// Byte length of a counter seed.
    pub const LEN: usize = 16;

    /// Create from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSeedLength {
                expected: Self::LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Generate a random seed.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Debug for CounterSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CounterSeed(..)")
    }
}

/// Apply the AES-128-CTR keystream for (`key`, `seed`) to `buf` in place.
///
/// Self-inverse: call once to encrypt, once more to decrypt.
pub fn apply_keystream(key: &CipherKey, seed: &CounterSeed, buf: &mut [u8]) {
    let mut cipher = Aes128CtrBE::new(key.as_bytes().into(), seed.as_bytes().into());
    cipher.apply_keystream(buf);
}
