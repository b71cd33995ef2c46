// Path: crates/client/src/lib.rs
//! # EcoPoints Client Crate Lints
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
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # EcoPoints Client
//!
//! Talks to an Ethereum JSON-RPC ledger node over HTTP.

pub mod json_rpc;
pub mod ledger_client;

// Re-export for convenience
pub use ledger_client::HttpLedgerClient;
