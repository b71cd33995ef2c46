// Path: crates/crypto/src/key_store.rs
//! Encrypted at-rest storage for the sender's signing key.
//!
//! Format V1:
//! [ Magic: "ECO-GKEY" (8) ]
//! [ Version: u16 (2) ]
//! [ KDF Algo: u8 (1) ]
//! [ KDF Mem KiB: u32 (4) ]
//! [ KDF Iters: u32 (4) ]
//! [ KDF Lanes: u8 (1) ]
//! [ Salt: 16B ]
//! [ AEAD Algo: u8 (1) ]
//! [ Nonce: 12B ]
//! [ Ciphertext + Tag: N + 16 ]
//!
//! The KEK is Argon2id over the passphrase with the header's parameters and
//! salt. The whole header is bound as AEAD associated data, so any edit to
//! it fails authentication.

use crate::error::CryptoError;
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::{rngs::OsRng, RngCore};
use std::io::Write;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// Header Constants
const HEADER_MAGIC: &[u8; 8] = b"ECO-GKEY";
const HEADER_VERSION: u16 = 1;
const HEADER_LEN: usize = 8 + 2 + 1 + 4 + 4 + 1 + 16 + 1 + 12; // 49 Bytes

const KDF_ALGO_ARGON2ID: u8 = 1;
const SALT_LEN: usize = 16;
const AEAD_ALGO_CHACHA20POLY1305: u8 = 1;
const NONCE_LEN: usize = 12;
const KEK_LEN: usize = 32;
const TAG_LEN: usize = 16;

// Upper bounds applied to parameters read from untrusted files.
const MAX_MEM_KIB: u32 = 4 * 1024 * 1024;
const MAX_ITERS: u32 = 64;
const MAX_LANES: u8 = 64;

/// A container for sensitive data that zeroizes on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBytes(pub Vec<u8>);

/// Argon2id cost parameters recorded in the envelope header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub mem_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub lanes: u8,
}

impl Default for KdfParams {
    /// Strong defaults for V1: 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self {
            mem_kib: 64 * 1024,
            iterations: 3,
            lanes: 4,
        }
    }
}

impl KdfParams {
    fn check(&self) -> Result<(), CryptoError> {
        if self.lanes == 0 || self.lanes > MAX_LANES {
            return Err(CryptoError::Unsupported(format!(
                "KDF lanes {} out of range",
                self.lanes
            )));
        }
        if self.iterations == 0 || self.iterations > MAX_ITERS {
            return Err(CryptoError::Unsupported(format!(
                "KDF iterations {} out of range",
                self.iterations
            )));
        }
        if self.mem_kib < 8 * u32::from(self.lanes) || self.mem_kib > MAX_MEM_KIB {
            return Err(CryptoError::Unsupported(format!(
                "KDF memory {} KiB out of range",
                self.mem_kib
            )));
        }
        Ok(())
    }

    fn derive_kek(
        &self,
        passphrase: &str,
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEK_LEN]>, CryptoError> {
        self.check()?;
        let params = Params::new(
            self.mem_kib,
            self.iterations,
            u32::from(self.lanes),
            Some(KEK_LEN),
        )
        .map_err(|e| CryptoError::Unsupported(format!("Argon2 parameters rejected: {}", e)))?;
        let mut kek = Zeroizing::new([0u8; KEK_LEN]);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password_into(passphrase.as_bytes(), salt, kek.as_mut_slice())
            .map_err(|e| CryptoError::OperationFailed(format!("Argon2 derivation failed: {}", e)))?;
        Ok(kek)
    }
}

/// Encrypts raw key bytes using a passphrase, wrapping them in the V1 format.
pub fn encrypt_key(secret: &[u8], passphrase: &str) -> Result<Vec<u8>, CryptoError> {
    encrypt_key_with_params(secret, passphrase, KdfParams::default())
}

/// Like [`encrypt_key`], with explicit KDF cost parameters.
pub fn encrypt_key_with_params(
    secret: &[u8],
    passphrase: &str,
    params: KdfParams,
) -> Result<Vec<u8>, CryptoError> {
    if passphrase.is_empty() {
        return Err(CryptoError::InvalidInput("Empty passphrase not allowed".into()));
    }

    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce_bytes);

    // Packed by hand for a stable, endian-independent on-disk format.
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(HEADER_MAGIC);
    header.extend_from_slice(&HEADER_VERSION.to_be_bytes());
    header.push(KDF_ALGO_ARGON2ID);
    header.extend_from_slice(&params.mem_kib.to_be_bytes());
    header.extend_from_slice(&params.iterations.to_be_bytes());
    header.push(params.lanes);
    header.extend_from_slice(&salt);
    header.push(AEAD_ALGO_CHACHA20POLY1305);
    header.extend_from_slice(&nonce_bytes);

    let kek = params.derive_kek(passphrase, &salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(kek.as_slice()));
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: secret,
                aad: &header,
            },
        )
        .map_err(|_| CryptoError::OperationFailed("Encryption failed".into()))?;

    let mut output = header;
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypts a key file blob using a passphrase, respecting the versioned header.
pub fn decrypt_key(data: &[u8], passphrase: &str) -> Result<SensitiveBytes, CryptoError> {
    let header = data
        .get(..HEADER_LEN)
        .ok_or_else(|| CryptoError::InvalidInput("File too short".into()))?;
    let mut reader = HeaderReader(header);

    if reader.take(HEADER_MAGIC.len())? != HEADER_MAGIC {
        return Err(CryptoError::InvalidInput("Invalid file signature".into()));
    }
    let version = reader.u16()?;
    if version != HEADER_VERSION {
        return Err(CryptoError::Unsupported(format!(
            "Unsupported key format version: {}",
            version
        )));
    }
    let kdf_id = reader.u8()?;
    if kdf_id != KDF_ALGO_ARGON2ID {
        return Err(CryptoError::Unsupported(format!("Unknown KDF id {}", kdf_id)));
    }
    let params = KdfParams {
        mem_kib: reader.u32()?,
        iterations: reader.u32()?,
        lanes: reader.u8()?,
    };
    let salt = reader.take(SALT_LEN)?;
    let aead_id = reader.u8()?;
    if aead_id != AEAD_ALGO_CHACHA20POLY1305 {
        return Err(CryptoError::Unsupported(format!("Unknown AEAD id {}", aead_id)));
    }
    let nonce_bytes = reader.take(NONCE_LEN)?;

    let ciphertext = data.get(HEADER_LEN..).unwrap_or_default();
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::InvalidInput("File too short".into()));
    }

    let kek = params.derive_kek(passphrase, salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(kek.as_slice()));
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| {
            CryptoError::OperationFailed(
                "Decryption failed (wrong password or corrupted file)".into(),
            )
        })?;

    Ok(SensitiveBytes(plaintext))
}

/// Returns `true` if the blob starts with the V1 envelope signature.
pub fn is_encrypted_envelope(data: &[u8]) -> bool {
    data.starts_with(HEADER_MAGIC)
}

/// Loads and decrypts a key file. Unencrypted key files are refused.
pub fn load_encrypted_file(path: &Path, passphrase: &str) -> Result<SensitiveBytes, CryptoError> {
    let content = std::fs::read(path).map_err(|e| {
        CryptoError::KeyUnavailable(format!("Failed to read key file {}: {}", path.display(), e))
    })?;
    if !is_encrypted_envelope(&content) {
        return Err(CryptoError::InvalidInput(format!(
            "{} is not an encrypted key file; plaintext keys are refused",
            path.display()
        )));
    }
    decrypt_key(&content, passphrase)
}

/// Encrypts `secret` and writes it to `path` atomically: the envelope goes to
/// a temporary sibling, is fsynced, then renamed over the target. On unix the
/// file is created with mode 0600.
pub fn save_encrypted_file(
    path: &Path,
    secret: &[u8],
    passphrase: &str,
    params: KdfParams,
) -> Result<(), CryptoError> {
    let encrypted = encrypt_key_with_params(secret, passphrase, params)?;
    let io_err = |e: std::io::Error| {
        CryptoError::OperationFailed(format!("Failed to write key file {}: {}", path.display(), e))
    };

    let mut temp_path = path.to_path_buf();
    if let Some(ext) = path.extension() {
        let mut ext_str = ext.to_os_string();
        ext_str.push(".tmp");
        temp_path.set_extension(ext_str);
    } else {
        temp_path.set_extension("tmp");
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&temp_path).map_err(io_err)?;
    file.write_all(&encrypted).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    std::fs::rename(&temp_path, path).map_err(io_err)?;
    log::info!(target: "key_store", "Wrote encrypted key file {}", path.display());
    Ok(())
}

struct HeaderReader<'a>(&'a [u8]);

impl<'a> HeaderReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CryptoError> {
        if self.0.len() < n {
            return Err(CryptoError::InvalidInput("Truncated header".into()));
        }
        let (head, tail) = self.0.split_at(n);
        self.0 = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, CryptoError> {
        Ok(self.take(1)?.first().copied().unwrap_or_default())
    }

    fn u16(&mut self) -> Result<u16, CryptoError> {
        let bytes: [u8; 2] = self
            .take(2)?
            .try_into()
            .map_err(|_| CryptoError::InvalidInput("Truncated header".into()))?;
        Ok(u16::from_be_bytes(bytes))
    }

    fn u32(&mut self) -> Result<u32, CryptoError> {
        let bytes: [u8; 4] = self
            .take(4)?
            .try_into()
            .map_err(|_| CryptoError::InvalidInput("Truncated header".into()))?;
        Ok(u32::from_be_bytes(bytes))
    }
}
