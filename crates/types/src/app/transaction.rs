// Path: crates/types/src/app/transaction.rs
//! Unsigned and signed ledger transactions, receipts and read-only calls.

use super::account::Account;
use alloy_primitives::{keccak256, Bytes, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-specified legacy (EIP-155) contract call, ready to be signed.
///
/// Two values built from the same intent, sender and nonce are equal field
/// for field, which makes their encodings and signing hashes byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// The sending account; pays gas and owns the nonce sequence.
    pub from: Account,
    /// The destination contract.
    pub to: Account,
    /// ABI-encoded call data.
    pub data: Bytes,
    /// Maximum gas the call may consume.
    pub gas_limit: u64,
    /// Price per unit of gas, in wei.
    pub gas_price: u128,
    /// The sender's sequence number for this transaction.
    pub nonce: u64,
    /// Wei transferred with the call. Reward calls send none.
    pub value: u128,
    /// The replay-protection chain id.
    pub chain_id: u64,
}

/// Per-call gas parameters that take precedence over configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasOverrides {
    /// Overrides the configured gas limit.
    #[serde(default)]
    pub gas_limit: Option<u64>,
    /// Overrides the configured gas price (wei).
    #[serde(default)]
    pub gas_price: Option<u128>,
}

/// A signed transaction envelope.
///
/// Produced and consumed within a single award operation. The raw bytes are
/// opaque to everything but the node; `Debug` prints only the hash and nonce.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    raw: Bytes,
    hash: B256,
    from: Account,
    nonce: u64,
}

impl SignedTransaction {
    /// Wraps an encoded envelope; the hash is computed as `keccak256(raw)`.
    pub fn from_raw_parts(raw: Bytes, from: Account, nonce: u64) -> Self {
        let hash = keccak256(&raw);
        Self {
            raw,
            hash,
            from,
            nonce,
        }
    }

    /// The encoded envelope submitted to the node.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// The transaction hash the node will report.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// The signing account.
    pub fn from(&self) -> Account {
        self.from
    }

    /// The nonce the envelope was signed with.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}

impl fmt::Debug for SignedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedTransaction")
            .field("hash", &self.hash)
            .field("from", &self.from)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}

/// The block parameter for state-reading RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// The most recent mined block.
    Latest,
    /// The pending state, including transactions still in the mempool.
    Pending,
    /// A specific block height.
    Number(u64),
}

/// The subset of a transaction receipt the engine relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// The hash of the transaction this receipt belongs to.
    pub transaction_hash: B256,
    /// The including block, absent while the receipt is still pending.
    pub block_number: Option<u64>,
    /// `1` on success, `0` when the call reverted.
    pub status: Option<u64>,
    /// Gas consumed by the transaction.
    pub gas_used: Option<u64>,
}

impl TransactionReceipt {
    /// Returns `true` if the receipt reports a mined transaction.
    pub fn is_mined(&self) -> bool {
        self.block_number.is_some()
    }
}

/// A read-only contract call (`eth_call`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Optional caller address.
    pub from: Option<Account>,
    /// The contract being called.
    pub to: Account,
    /// ABI-encoded call data.
    pub data: Bytes,
}
