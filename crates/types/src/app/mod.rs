// Path: crates/types/src/app/mod.rs
//! Core application-level data structures: accounts, reward intents and ledger transactions.

/// Ledger account identifiers and the address validator.
pub mod account;
/// Reward intents, transaction results and oracle verdicts.
pub mod reward;
/// Unsigned and signed ledger transactions, receipts and read-only calls.
pub mod transaction;

pub use account::{validate, Account};
pub use reward::*;
pub use transaction::*;
