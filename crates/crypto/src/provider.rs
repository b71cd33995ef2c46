// Path: crates/crypto/src/provider.rs
//! `KeyProvider` implementations for the sending account.
//!
//! Every provider resolves its key once at construction and keeps it in a
//! zeroizing buffer. `acquire` hands out a fresh [`ScopedKey`] per signature.

use crate::error::CryptoError;
use crate::key_store::load_encrypted_file;
use ecopoints_api::crypto::{KeyProvider, ScopedKey, SECRET_KEY_LEN};
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

type KeyBuffer = Zeroizing<[u8; SECRET_KEY_LEN]>;

fn buffer_from_slice(bytes: &[u8]) -> Result<KeyBuffer, CryptoError> {
    let array: [u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "expected {} key bytes, got {}",
            SECRET_KEY_LEN,
            bytes.len()
        ))
    })?;
    Ok(Zeroizing::new(array))
}

/// Parses a hex-encoded secret key, with or without `0x` and surrounding whitespace.
pub fn parse_hex_key(raw: &str) -> Result<ScopedKey, CryptoError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let decoded = Zeroizing::new(
        hex::decode(digits).map_err(|_| CryptoError::InvalidKey("key is not valid hex".into()))?,
    );
    ScopedKey::from_slice(&decoded)
}

/// A hex key read once from an environment variable.
pub struct EnvKeyProvider {
    var: String,
    key: KeyBuffer,
}

impl EnvKeyProvider {
    /// Reads and parses the named variable.
    pub fn from_env(var: &str) -> Result<Self, CryptoError> {
        let raw = Zeroizing::new(std::env::var(var).map_err(|_| {
            CryptoError::KeyUnavailable(format!("environment variable {} is not set", var))
        })?);
        let key = parse_hex_key(&raw)?;
        log::debug!(target: "key_store", "Loaded signing key from ${}", var);
        Ok(Self {
            var: var.to_string(),
            key: Zeroizing::new(*key.expose()),
        })
    }
}

impl KeyProvider for EnvKeyProvider {
    fn acquire(&self) -> Result<ScopedKey, CryptoError> {
        Ok(ScopedKey::new(*self.key))
    }

    fn describe(&self) -> String {
        format!("env:{}", self.var)
    }
}

impl fmt::Debug for EnvKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvKeyProvider")
            .field("var", &self.var)
            .finish_non_exhaustive()
    }
}

/// A key file in the encrypted V1 envelope, decrypted once at startup.
pub struct EncryptedFileKeyProvider {
    path: PathBuf,
    key: KeyBuffer,
}

impl EncryptedFileKeyProvider {
    /// Decrypts `path` with the passphrase held in `passphrase_env`.
    pub fn open(path: &Path, passphrase_env: &str) -> Result<Self, CryptoError> {
        let passphrase = Zeroizing::new(std::env::var(passphrase_env).map_err(|_| {
            CryptoError::KeyUnavailable(format!(
                "passphrase variable {} is not set",
                passphrase_env
            ))
        })?);
        Self::open_with_passphrase(path, &passphrase)
    }

    /// Decrypts `path` with an explicit passphrase.
    pub fn open_with_passphrase(path: &Path, passphrase: &str) -> Result<Self, CryptoError> {
        let secret = load_encrypted_file(path, passphrase)?;
        let key = buffer_from_slice(&secret.0)?;
        log::debug!(target: "key_store", "Decrypted signing key from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            key,
        })
    }
}

impl KeyProvider for EncryptedFileKeyProvider {
    fn acquire(&self) -> Result<ScopedKey, CryptoError> {
        Ok(ScopedKey::new(*self.key))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

impl fmt::Debug for EncryptedFileKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedFileKeyProvider")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// An in-memory key, for tests and tooling.
pub struct StaticKeyProvider {
    key: KeyBuffer,
}

impl StaticKeyProvider {
    /// Wraps raw key bytes.
    pub fn new(key: [u8; SECRET_KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Parses a hex-encoded key.
    pub fn from_hex(raw: &str) -> Result<Self, CryptoError> {
        let key = parse_hex_key(raw)?;
        Ok(Self::new(*key.expose()))
    }
}

impl KeyProvider for StaticKeyProvider {
    fn acquire(&self) -> Result<ScopedKey, CryptoError> {
        Ok(ScopedKey::new(*self.key))
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

impl fmt::Debug for StaticKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticKeyProvider(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_store::{save_encrypted_file, KdfParams};

    const KEY_HEX: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_hex_key_variants() {
        let a = parse_hex_key(KEY_HEX).unwrap();
        let b = parse_hex_key(&format!("  {}\n", &KEY_HEX[2..])).unwrap();
        assert_eq!(a.expose(), b.expose());
        assert!(matches!(parse_hex_key("0x1234"), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(parse_hex_key("not hex"), Err(CryptoError::InvalidKey(_))));
    }

    #[test]
    fn test_env_provider() {
        std::env::set_var("ECOPOINTS_PROVIDER_TEST_KEY", KEY_HEX);
        let provider = EnvKeyProvider::from_env("ECOPOINTS_PROVIDER_TEST_KEY").unwrap();
        let key = provider.acquire().unwrap();
        assert_eq!(key.expose(), parse_hex_key(KEY_HEX).unwrap().expose());
        assert_eq!(provider.describe(), "env:ECOPOINTS_PROVIDER_TEST_KEY");
        assert!(!format!("{:?}", provider).contains("ac0974"));

        assert!(matches!(
            EnvKeyProvider::from_env("ECOPOINTS_PROVIDER_TEST_UNSET"),
            Err(CryptoError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn test_encrypted_file_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin.key");
        let fast = KdfParams {
            mem_kib: 64,
            iterations: 1,
            lanes: 1,
        };
        save_encrypted_file(&path, &[5u8; 32], "hunter2", fast).unwrap();

        let provider = EncryptedFileKeyProvider::open_with_passphrase(&path, "hunter2").unwrap();
        assert_eq!(provider.acquire().unwrap().expose(), &[5u8; 32]);
        assert!(provider.describe().starts_with("file:"));

        assert!(EncryptedFileKeyProvider::open_with_passphrase(&path, "wrong").is_err());
    }

    #[test]
    fn test_static_provider_debug_redacted() {
        let provider = StaticKeyProvider::from_hex(KEY_HEX).unwrap();
        assert_eq!(format!("{:?}", provider), "StaticKeyProvider(<redacted>)");
    }
}
