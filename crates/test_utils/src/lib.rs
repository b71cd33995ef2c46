// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # EcoPoints Test Utilities
//!
//! An in-memory ledger node, scripted oracles, and shared fixtures for
//! testing the reward ledger components.

pub mod assertions;
pub mod fixtures;
pub mod mock_node;
pub mod oracle;

pub use mock_node::{Faults, MockLedgerNode};
pub use oracle::StaticOracle;

#[doc(hidden)]
pub use ecopoints_types::error::ErrorCode;
