// Path: crates/crypto/src/lib.rs
//! # EcoPoints Crypto Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # EcoPoints Cryptography
//!
//! secp256k1 signing and address derivation, the encrypted on-disk key
//! envelope, and the `KeyProvider` implementations the signer draws from.

pub mod error;
pub mod key_store;
pub mod provider;
pub mod sign;

pub use provider::{EncryptedFileKeyProvider, EnvKeyProvider, StaticKeyProvider};
pub use alloy_primitives::Signature;
pub use sign::secp256k1::{recover_address, Secp256k1KeyPair};
