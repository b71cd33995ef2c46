// Path: crates/api/src/ledger/mod.rs
//! The engine's view of a JSON-RPC ledger node.

use crate::error::NodeError;
use async_trait::async_trait;
use ecopoints_types::app::{Account, BlockTag, CallRequest, TransactionReceipt};
use ecopoints_types::{Bytes, B256};

/// A ledger node reachable over JSON-RPC.
///
/// Every method performs exactly one request. Retrying, backoff and
/// classification of failures are the caller's concern; implementations
/// only translate the wire format to and from [`NodeError`].
#[async_trait]
pub trait LedgerNode: Send + Sync {
    /// Returns the node's chain id (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64, NodeError>;

    /// Returns the number of transactions sent from `account` as of `block`
    /// (`eth_getTransactionCount`). With [`BlockTag::Pending`] this includes
    /// transactions still waiting in the node's pool.
    async fn transaction_count(&self, account: Account, block: BlockTag)
        -> Result<u64, NodeError>;

    /// Submits an encoded, signed transaction and returns the hash the node
    /// assigned to it (`eth_sendRawTransaction`).
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, NodeError>;

    /// Returns the receipt for `hash`, or `None` if it is not yet mined
    /// (`eth_getTransactionReceipt`).
    async fn transaction_receipt(&self, hash: &B256)
        -> Result<Option<TransactionReceipt>, NodeError>;

    /// Executes a read-only call against `block` state (`eth_call`).
    async fn call(&self, request: &CallRequest, block: BlockTag) -> Result<Bytes, NodeError>;
}
