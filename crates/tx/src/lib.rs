// Path: crates/tx/src/lib.rs
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
//! # EcoPoints Transactions
//!
//! Everything between a `RewardIntent` and the bytes handed to the node:
//! contract ABI encoding, the EIP-155 legacy envelope, the deterministic
//! builder, the fail-closed signer and the per-account nonce sequencer.

pub mod abi;
pub mod builder;
pub mod codec;
pub mod error;
pub mod signer;
pub mod system;

pub use abi::ContractAbi;
pub use builder::TransactionBuilder;
pub use codec::DecodedTransaction;
pub use error::{AbiError, CodecError};
pub use signer::Signer;
pub use system::nonce::{NonceLease, NonceSequencer};
