// Path: crates/api/src/crypto/mod.rs
//! Defines the key provider seam used by the transaction signer.

use crate::error::CryptoError;
use std::fmt;
use zeroize::Zeroizing;

/// Length in bytes of a secp256k1 secret scalar.
pub const SECRET_KEY_LEN: usize = 32;

/// A short-lived handle to raw signing key material.
///
/// The bytes are wiped when the handle is dropped. Callers acquire a key,
/// sign with it, and let it fall out of scope; the handle is deliberately
/// neither `Clone` nor `Serialize`, and its `Debug` output is redacted.
pub struct ScopedKey(Zeroizing<[u8; SECRET_KEY_LEN]>);

impl ScopedKey {
    /// Takes ownership of raw key bytes.
    pub fn new(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Copies a key out of a slice, rejecting anything that is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "expected {} key bytes, got {}",
                SECRET_KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::new(array))
    }

    /// Borrows the raw key bytes.
    pub fn expose(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for ScopedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScopedKey(<redacted>)")
    }
}

/// A source of the sending account's signing key.
///
/// A provider is consulted once per signature. Implementations decide how
/// the key is held between calls (environment, encrypted file, memory); the
/// engine never caches the returned [`ScopedKey`].
pub trait KeyProvider: Send + Sync {
    /// Acquires the signing key for the duration of one signature.
    fn acquire(&self) -> Result<ScopedKey, CryptoError>;

    /// A short, non-secret description of where the key comes from, for logs.
    fn describe(&self) -> String;
}
