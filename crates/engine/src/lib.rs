// Path: crates/engine/src/lib.rs
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
//! # EcoPoints Engine
//!
//! Turns "award N points to user U" into a correctly ordered, signed,
//! submitted and confirmed ledger transaction.
//!
//! The [`RewardLedger`] facade is the stable entry point. Underneath it,
//! the [`submission::Submitter`] owns the per-account nonce critical section
//! (fetch nonce, build, sign, submit) and the
//! [`confirmation::ConfirmationPoller`] waits for a receipt outside of it.

pub mod confirmation;
pub mod error;
pub mod facade;
pub mod oracle;
pub mod proofs;
pub mod retry;
pub mod setup;
pub mod submission;

pub use error::SetupError;
pub use facade::{AwardOptions, RewardLedger};
pub use oracle::HttpVerificationOracle;
pub use retry::RetryPolicy;
