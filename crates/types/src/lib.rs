// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # EcoPoints Types
//!
//! This crate is the foundational library for the EcoPoints reward ledger,
//! containing the core data structures, error types, and configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `ecopoints-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. It provides the canonical
//! definitions for shared types like `Account`, `UnsignedTransaction`,
//! `TransactionResult`, and the reward error taxonomy.

/// Core application-level data structures like `Account`, `RewardIntent`, and transactions.
pub mod app;
/// Shared configuration structures (`LedgerConfig` and its sections).
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;

pub use alloy_primitives::{Address, Bytes, B256, U256};

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::RewardError> = std::result::Result<T, E>;
