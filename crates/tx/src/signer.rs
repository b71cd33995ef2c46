// Path: crates/tx/src/signer.rs
//! The transaction signer.

use crate::codec::{encode_signed, signing_hash};
use ecopoints_api::crypto::KeyProvider;
use ecopoints_crypto::Secp256k1KeyPair;
use ecopoints_types::app::{Account, SignedTransaction, UnsignedTransaction};
use ecopoints_types::error::SigningError;
use std::fmt;
use std::sync::Arc;

/// Signs transactions for the single sending account.
///
/// The key is acquired from the provider for each signature and dropped as
/// soon as the signature exists. Anything that would give the transaction
/// undefined semantics aborts signing.
#[derive(Clone)]
pub struct Signer {
    provider: Arc<dyn KeyProvider>,
    address: Account,
}

impl Signer {
    /// Creates a signer, deriving the sending account from the provider's key.
    pub fn new(provider: Arc<dyn KeyProvider>) -> Result<Self, SigningError> {
        let address = {
            let key = provider.acquire()?;
            Secp256k1KeyPair::from_scoped_key(&key)?.address()?
        };
        tracing::debug!(
            target: "signer",
            source = %provider.describe(),
            %address,
            "Signer ready"
        );
        Ok(Self { provider, address })
    }

    /// Like [`Signer::new`], additionally requiring the key to control `expected`.
    pub fn for_account(
        provider: Arc<dyn KeyProvider>,
        expected: Account,
    ) -> Result<Self, SigningError> {
        let signer = Self::new(provider)?;
        if signer.address != expected {
            return Err(SigningError::KeyMismatch {
                expected,
                actual: signer.address,
            });
        }
        Ok(signer)
    }

    /// The account this signer's key controls.
    pub fn address(&self) -> Account {
        self.address
    }

    /// Signs `tx` into an EIP-155 envelope.
    pub fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SigningError> {
        check_well_formed(tx)?;
        if tx.from != self.address {
            return Err(SigningError::KeyMismatch {
                expected: tx.from,
                actual: self.address,
            });
        }

        let signature = {
            let key = self.provider.acquire()?;
            let pair = Secp256k1KeyPair::from_scoped_key(&key)?;
            let actual = pair.address()?;
            if actual != tx.from {
                return Err(SigningError::KeyMismatch {
                    expected: tx.from,
                    actual,
                });
            }
            pair.sign_prehash(&signing_hash(tx))?
        };

        let raw = encode_signed(tx, &signature)?;
        let signed = SignedTransaction::from_raw_parts(raw.into(), tx.from, tx.nonce);
        tracing::debug!(
            target: "signer",
            hash = %signed.hash(),
            nonce = tx.nonce,
            "Signed transaction"
        );
        Ok(signed)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .field("source", &self.provider.describe())
            .finish()
    }
}

fn check_well_formed(tx: &UnsignedTransaction) -> Result<(), SigningError> {
    let reject = |reason: &str| Err(SigningError::MalformedTransaction(reason.to_string()));
    if tx.gas_limit == 0 {
        return reject("gas limit is zero");
    }
    if tx.gas_price == 0 {
        return reject("gas price is zero");
    }
    if tx.chain_id == 0 {
        return reject("chain id is zero");
    }
    if tx.data.len() < 4 {
        return reject("call data has no function selector");
    }
    Ok(())
}
