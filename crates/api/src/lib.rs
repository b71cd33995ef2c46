// Path: crates/api/src/lib.rs

//! # EcoPoints API Crate Lints
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
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
#![deny(missing_docs)]
//! # EcoPoints API
//!
//! The seams of the reward engine. The engine talks to the ledger, the proof
//! classifier and the key store only through the traits defined here, so
//! each can be swapped for a mock in tests.

/// Defines the `KeyProvider` trait and the zeroizing `ScopedKey` handle.
pub mod crypto;
/// Re-exports the core error types from the central `ecopoints-types` crate.
pub mod error;
/// Defines the `LedgerNode` trait, the engine's view of a JSON-RPC node.
pub mod ledger;
/// Defines the `VerificationOracle` trait for proof classification.
pub mod oracle;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::crypto::{KeyProvider, ScopedKey};
    pub use crate::error::{
        CryptoError, ErrorCode, NodeError, OracleError, RewardError, SigningError,
        ValidationError,
    };
    pub use crate::ledger::LedgerNode;
    pub use crate::oracle::VerificationOracle;
}
