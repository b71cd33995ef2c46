// Path: crates/test_utils/src/mock_node/mod.rs
//! An in-memory ledger node with injectable faults.
//!
//! Raw transactions are decoded and their senders recovered exactly as a
//! real node would, nonces are enforced strictly, and `awardPoints` calls to
//! the configured contract are applied to an in-memory balance table when
//! the transaction is mined.

use async_trait::async_trait;
use ecopoints_api::ledger::LedgerNode;
use ecopoints_tx::abi::ContractAbi;
use ecopoints_tx::codec::{decode_signed, DecodedTransaction};
use ecopoints_types::app::{Account, BlockTag, CallRequest, TransactionReceipt};
use ecopoints_types::error::NodeError;
use ecopoints_types::{Address, Bytes, B256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Failure behaviour of a [`MockLedgerNode`].
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Every call fails with a transport error.
    pub unreachable: bool,
    /// The next N `eth_sendRawTransaction` calls fail with a transport error
    /// before the node sees the payload.
    pub transient_send_failures: u32,
    /// The next N accepted submissions lose their response: the node keeps
    /// the transaction but the caller sees a transport error.
    pub drop_send_response: u32,
    /// Accepted transactions are never mined.
    pub never_include: bool,
    /// Mined transactions revert (status `0x0`) without changing balances.
    pub revert: bool,
    /// Accepted transactions are mined only after this many receipt polls.
    pub inclusion_delay_polls: u32,
    /// The next N receipt polls fail with a transport error.
    pub transient_receipt_failures: u32,
    /// The next N `eth_getTransactionCount` calls report zero.
    pub stale_nonce_reads: u32,
    /// A resubmitted payload that is already mined is refused with
    /// `nonce too low` rather than `already known`.
    pub mined_resend_nonce_too_low: bool,
    /// Delay applied to each `eth_sendRawTransaction` before it is processed.
    pub send_delay: Option<Duration>,
}

#[derive(Debug)]
struct Pooled {
    tx: DecodedTransaction,
    polls_remaining: u32,
}

#[derive(Debug, Default)]
struct NodeState {
    faults: Faults,
    mined_nonces: HashMap<Account, u64>,
    pool: HashMap<B256, Pooled>,
    receipts: HashMap<B256, TransactionReceipt>,
    accepted: Vec<DecodedTransaction>,
    points: HashMap<Address, U256>,
    block_number: u64,
}

impl NodeState {
    fn pending_nonce(&self, account: &Account) -> u64 {
        let mined = self.mined_nonces.get(account).copied().unwrap_or_default();
        let pooled = self.pool.values().filter(|p| p.tx.sender == *account).count();
        mined + pooled as u64
    }

    fn mine(&mut self, hash: B256, abi: &ContractAbi, contract: &Account) {
        let Some(pooled) = self.pool.remove(&hash) else {
            return;
        };
        self.block_number += 1;
        *self.mined_nonces.entry(pooled.tx.sender).or_default() += 1;

        let applied = !self.faults.revert
            && pooled.tx.to == Some(contract.address())
            && match abi.decode_award_points(&pooled.tx.data) {
                Ok((target, amount)) => {
                    let balance = self.points.entry(target).or_default();
                    *balance = balance.saturating_add(amount);
                    true
                }
                Err(_) => false,
            };

        self.receipts.insert(
            hash,
            TransactionReceipt {
                transaction_hash: hash,
                block_number: Some(self.block_number),
                status: Some(u64::from(applied)),
                gas_used: Some(21_000),
            },
        );
    }
}

/// Counts of calls made against a [`MockLedgerNode`].
#[derive(Debug, Default)]
pub struct CallCounts {
    chain_id: AtomicU64,
    nonce_queries: AtomicU64,
    sends: AtomicU64,
    receipt_polls: AtomicU64,
    calls: AtomicU64,
}

fn rpc_error(message: &str) -> NodeError {
    NodeError::Rpc {
        code: -32000,
        message: message.to_string(),
    }
}

fn unreachable_error() -> NodeError {
    NodeError::Transport("connection refused".into())
}

/// An in-memory [`LedgerNode`].
#[derive(Debug)]
pub struct MockLedgerNode {
    chain_id: u64,
    contract: Account,
    abi: ContractAbi,
    state: Mutex<NodeState>,
    counts: CallCounts,
}

impl MockLedgerNode {
    /// Creates a node for `chain_id` hosting the points contract at `contract`.
    pub fn new(chain_id: u64, contract: Account) -> Self {
        Self {
            chain_id,
            contract,
            abi: ContractAbi::builtin(),
            state: Mutex::new(NodeState::default()),
            counts: CallCounts::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the fault configuration.
    pub fn set_faults(&self, faults: Faults) {
        self.state().faults = faults;
    }

    /// Simulates another writer that has already used `count` nonces of `account`.
    pub fn advance_nonce(&self, account: Account, count: u64) {
        *self.state().mined_nonces.entry(account).or_default() += count;
    }

    /// Mines every pooled transaction regardless of faults other than `revert`.
    pub fn mine_all(&self) {
        let mut state = self.state();
        let hashes: Vec<B256> = state.pool.keys().copied().collect();
        for hash in hashes {
            state.mine(hash, &self.abi, &self.contract);
        }
    }

    /// Evicts every pooled transaction without mining it, as a node restart
    /// or mempool flush does.
    pub fn drop_pool(&self) {
        self.state().pool.clear();
    }

    /// The points balance recorded for `account`.
    pub fn points_of(&self, account: &Account) -> U256 {
        self.state()
            .points
            .get(&account.address())
            .copied()
            .unwrap_or_default()
    }

    /// Every transaction the node accepted, in acceptance order.
    pub fn accepted_transactions(&self) -> Vec<DecodedTransaction> {
        self.state().accepted.clone()
    }

    /// Number of transactions waiting to be mined.
    pub fn pool_len(&self) -> usize {
        self.state().pool.len()
    }

    /// `eth_chainId` calls made.
    pub fn chain_id_queries(&self) -> u64 {
        self.counts.chain_id.load(Ordering::SeqCst)
    }

    /// `eth_getTransactionCount` calls made.
    pub fn nonce_queries(&self) -> u64 {
        self.counts.nonce_queries.load(Ordering::SeqCst)
    }

    /// `eth_sendRawTransaction` calls made, including failed ones.
    pub fn sends(&self) -> u64 {
        self.counts.sends.load(Ordering::SeqCst)
    }

    /// `eth_getTransactionReceipt` calls made.
    pub fn receipt_polls(&self) -> u64 {
        self.counts.receipt_polls.load(Ordering::SeqCst)
    }

    /// `eth_call` calls made.
    pub fn calls(&self) -> u64 {
        self.counts.calls.load(Ordering::SeqCst)
    }

    fn accept(&self, raw: &[u8]) -> Result<B256, NodeError> {
        let tx = decode_signed(raw)
            .map_err(|e| rpc_error(&format!("invalid transaction: {}", e)))?;
        if tx.chain_id != Some(self.chain_id) {
            return Err(rpc_error("invalid chain id for signer"));
        }
        let sender = tx.sender;

        let mut state = self.state();
        let hash = tx.hash;
        if state.receipts.contains_key(&hash) && state.faults.mined_resend_nonce_too_low {
            let expected = state.pending_nonce(&sender);
            return Err(rpc_error(&format!(
                "nonce too low: next nonce {}, tx nonce {}",
                expected, tx.nonce
            )));
        }
        if state.pool.contains_key(&hash) || state.receipts.contains_key(&hash) {
            return Err(rpc_error("already known"));
        }
        let expected = state.pending_nonce(&sender);
        if tx.nonce < expected {
            return Err(rpc_error(&format!(
                "nonce too low: next nonce {}, tx nonce {}",
                expected, tx.nonce
            )));
        }
        if tx.nonce > expected {
            return Err(rpc_error(&format!(
                "nonce too high: next nonce {}, tx nonce {}",
                expected, tx.nonce
            )));
        }

        state.accepted.push(tx.clone());
        let polls_remaining = state.faults.inclusion_delay_polls;
        state.pool.insert(
            hash,
            Pooled {
                tx,
                polls_remaining,
            },
        );
        if polls_remaining == 0 && !state.faults.never_include {
            state.mine(hash, &self.abi, &self.contract);
        }

        if state.faults.drop_send_response > 0 {
            state.faults.drop_send_response -= 1;
            return Err(NodeError::Transport("connection reset by peer".into()));
        }
        Ok(hash)
    }
}

#[async_trait]
impl LedgerNode for MockLedgerNode {
    async fn chain_id(&self) -> Result<u64, NodeError> {
        self.counts.chain_id.fetch_add(1, Ordering::SeqCst);
        if self.state().faults.unreachable {
            return Err(unreachable_error());
        }
        Ok(self.chain_id)
    }

    async fn transaction_count(
        &self,
        account: Account,
        block: BlockTag,
    ) -> Result<u64, NodeError> {
        self.counts.nonce_queries.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        if state.faults.unreachable {
            return Err(unreachable_error());
        }
        if state.faults.stale_nonce_reads > 0 {
            state.faults.stale_nonce_reads -= 1;
            return Ok(0);
        }
        Ok(match block {
            BlockTag::Pending => state.pending_nonce(&account),
            BlockTag::Latest | BlockTag::Number(_) => {
                state.mined_nonces.get(&account).copied().unwrap_or_default()
            }
        })
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, NodeError> {
        self.counts.sends.fetch_add(1, Ordering::SeqCst);
        let delay = self.state().faults.send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        {
            let mut state = self.state();
            if state.faults.unreachable {
                return Err(unreachable_error());
            }
            if state.faults.transient_send_failures > 0 {
                state.faults.transient_send_failures -= 1;
                return Err(NodeError::Http {
                    status: 503,
                    body: "service unavailable".into(),
                });
            }
        }
        self.accept(raw)
    }

    async fn transaction_receipt(
        &self,
        hash: &B256,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        self.counts.receipt_polls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        if state.faults.unreachable {
            return Err(unreachable_error());
        }
        if state.faults.transient_receipt_failures > 0 {
            state.faults.transient_receipt_failures -= 1;
            return Err(NodeError::Transport("request timed out".into()));
        }
        if let Some(receipt) = state.receipts.get(hash) {
            return Ok(Some(receipt.clone()));
        }
        let never_include = state.faults.never_include;
        let ready = match state.pool.get_mut(hash) {
            Some(_) if never_include => false,
            Some(pooled) if pooled.polls_remaining > 1 => {
                pooled.polls_remaining -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if ready {
            state.mine(*hash, &self.abi, &self.contract);
        }
        Ok(state.receipts.get(hash).cloned())
    }

    async fn call(&self, request: &CallRequest, _block: BlockTag) -> Result<Bytes, NodeError> {
        self.counts.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        if state.faults.unreachable {
            return Err(unreachable_error());
        }
        if request.to != self.contract {
            return Ok(Bytes::new());
        }
        let target = self
            .abi
            .decode_get_points(&request.data)
            .map_err(|_| rpc_error("execution reverted"))?;
        let points = state.points.get(&target).copied().unwrap_or_default();
        Ok(self.abi.encode_points(points))
    }
}

#[cfg(test)]
mod tests;
