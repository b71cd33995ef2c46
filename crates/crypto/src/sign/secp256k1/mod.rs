// Path: crates/crypto/src/sign/secp256k1/mod.rs
//! secp256k1 ECDSA with public key recovery, as used by ledger transactions.

use crate::error::CryptoError;
use alloy_primitives::{hex, Signature, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use ecopoints_api::crypto::ScopedKey;
use ecopoints_types::app::Account;
use std::fmt;
use zeroize::Zeroize;

/// Half the secp256k1 group order; `s` values above it are rejected.
const SECP256K1N_HALF: [u8; 32] =
    hex!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// A secp256k1 signing key.
///
/// The inner key wipes itself on drop. `Debug` prints the derived address only.
pub struct Secp256k1KeyPair {
    signer: PrivateKeySigner,
}

impl Secp256k1KeyPair {
    /// Generates a fresh key from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Parses raw key material.
    pub fn from_scoped_key(key: &ScopedKey) -> Result<Self, CryptoError> {
        let signer = PrivateKeySigner::from_slice(key.expose()).map_err(|_| {
            CryptoError::InvalidKey("not a valid secp256k1 secret scalar".into())
        })?;
        Ok(Self { signer })
    }

    /// Exports the raw key material into a zeroizing handle.
    pub fn to_scoped_key(&self) -> ScopedKey {
        let mut bytes = self.signer.to_bytes();
        let key = ScopedKey::new(bytes.0);
        bytes.0.zeroize();
        key
    }

    /// The ledger account controlled by this key.
    pub fn address(&self) -> Result<Account, CryptoError> {
        Account::from_address(self.signer.address())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Signs a 32-byte prehash.
    ///
    /// Signatures are deterministic (RFC 6979) and low-S, as ledger nodes
    /// reject high-S signatures. The parity is the bare `y` bit; EIP-155
    /// encoding of `v` is left to the transaction codec.
    pub fn sign_prehash(&self, prehash: &B256) -> Result<Signature, CryptoError> {
        let signature = self
            .signer
            .sign_hash_sync(prehash)
            .map_err(|e| CryptoError::OperationFailed(format!("secp256k1 signing failed: {}", e)))?;
        if is_high_s(signature.s()) {
            return Err(CryptoError::OperationFailed(
                "signer produced a high-S signature".into(),
            ));
        }
        Ok(signature)
    }
}

impl fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

fn is_high_s(s: U256) -> bool {
    s > U256::from_be_bytes(SECP256K1N_HALF)
}

/// Recovers the signing account from a prehash and signature.
///
/// High-S signatures are rejected.
pub fn recover_address(prehash: &B256, signature: &Signature) -> Result<Account, CryptoError> {
    if is_high_s(signature.s()) {
        return Err(CryptoError::InvalidInput("signature is not low-S".into()));
    }
    let address = signature
        .recover_address_from_prehash(prehash)
        .map_err(|_| CryptoError::InvalidInput("public key recovery failed".into()))?;
    Account::from_address(address).map_err(|e| CryptoError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests;
