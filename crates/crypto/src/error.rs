// Path: crates/crypto/src/error.rs
//! Local error types for the `ecopoints-crypto` crate.

// Re-export the canonical error type from the API crate.
pub use ecopoints_api::error::CryptoError;
