// Path: crates/tx/src/system/nonce.rs

//! Per-account nonce sequencing for the sending account.
//!
//! Every submission from an account holds that account's lease from nonce
//! resolution until the node has accepted (or refused) the signed bytes, so
//! two concurrent awards can never be built with the same nonce.

use dashmap::DashMap;
use ecopoints_telemetry::ledger_metrics;
use ecopoints_types::app::Account;
use ecopoints_types::B256;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
struct NonceSlot {
    /// The lowest nonce not yet consumed by an accepted submission, if any
    /// submission has been accepted in this process.
    next_local: Option<u64>,
    /// The hash of the transaction that consumed `next_local - 1`.
    last_hash: Option<B256>,
}

/// Serializes nonce assignment per sending account.
#[derive(Debug, Default)]
pub struct NonceSequencer {
    slots: DashMap<Account, Arc<Mutex<NonceSlot>>>,
}

impl NonceSequencer {
    /// Creates an empty sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive use of `account`'s nonce sequence.
    pub async fn lock(&self, account: Account) -> NonceLease {
        // Clone the slot out so the map shard is not held across the await.
        let slot = self.slots.entry(account).or_default().clone();
        NonceLease {
            guard: slot.lock_owned().await,
            account,
        }
    }
}

/// Exclusive access to one account's nonce sequence.
///
/// Dropping a lease without calling [`NonceLease::commit`] consumes nothing.
#[derive(Debug)]
pub struct NonceLease {
    guard: OwnedMutexGuard<NonceSlot>,
    account: Account,
}

impl NonceLease {
    /// The account this lease covers.
    pub fn account(&self) -> Account {
        self.account
    }

    /// The nonce to use, given the node's pending transaction count.
    ///
    /// The node may lag behind submissions this process has already made, so
    /// the larger of the two wins. A node that has dropped those submissions
    /// looks the same; callers tell the cases apart with
    /// [`NonceLease::unaccounted`] and [`NonceLease::rewind`].
    pub fn resolve(&self, node_pending: u64) -> u64 {
        match self.guard.next_local {
            Some(local) => local.max(node_pending),
            None => node_pending,
        }
    }

    /// The hash of the last committed transaction, when the node's pending
    /// count does not cover it.
    pub fn unaccounted(&self, node_pending: u64) -> Option<B256> {
        match (self.guard.next_local, self.guard.last_hash) {
            (Some(local), Some(hash)) if local > node_pending => Some(hash),
            _ => None,
        }
    }

    /// Forgets the local sequence so the next [`NonceLease::resolve`] follows
    /// the node.
    pub fn rewind(&mut self, node_pending: u64) {
        if let Some(local) = self.guard.next_local.take() {
            tracing::warn!(
                target: "nonce",
                account = %self.account,
                local,
                node_pending,
                "Rewinding nonce to node pending count"
            );
        }
        self.guard.last_hash = None;
        ledger_metrics().set_next_nonce(node_pending);
    }

    /// Records that the node refused `nonce` as already used.
    pub fn skip_past(&mut self, nonce: u64) {
        let next = nonce.saturating_add(1);
        if self.guard.next_local.map_or(true, |n| n < next) {
            self.guard.next_local = Some(next);
            self.guard.last_hash = None;
        }
    }

    /// Records that the transaction `hash` with `nonce` was accepted by the node.
    pub fn commit(&mut self, nonce: u64, hash: B256) {
        let next = nonce.saturating_add(1);
        let advanced = self.guard.next_local.map_or(next, |n| n.max(next));
        self.guard.next_local = Some(advanced);
        if advanced == next {
            self.guard.last_hash = Some(hash);
        }
        ledger_metrics().set_next_nonce(advanced);
        tracing::trace!(target: "nonce", account = %self.account, next = advanced, "Committed nonce");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecopoints_types::app::validate;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn account() -> Account {
        validate("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
    }

    fn hash(n: u8) -> B256 {
        B256::repeat_byte(n)
    }

    #[tokio::test]
    async fn test_resolve_prefers_larger_source() {
        let seq = NonceSequencer::new();
        let mut lease = seq.lock(account()).await;
        assert_eq!(lease.resolve(3), 3);
        lease.commit(3, hash(3));
        // A lagging node read does not rewind the local sequence.
        assert_eq!(lease.resolve(2), 4);
        // A node that is ahead (another writer) wins.
        assert_eq!(lease.resolve(9), 9);
        drop(lease);
        assert_eq!(seq.lock(account()).await.resolve(0), 4);
    }

    #[tokio::test]
    async fn test_uncommitted_lease_consumes_nothing() {
        let seq = NonceSequencer::new();
        {
            let lease = seq.lock(account()).await;
            assert_eq!(lease.resolve(0), 0);
        }
        let lease = seq.lock(account()).await;
        assert_eq!(lease.resolve(0), 0);
        assert_eq!(lease.unaccounted(0), None);
    }

    #[tokio::test]
    async fn test_rewind_after_node_forgets_submission() {
        let seq = NonceSequencer::new();
        let mut lease = seq.lock(account()).await;
        lease.commit(0, hash(1));
        assert_eq!(lease.unaccounted(1), None);
        assert_eq!(lease.unaccounted(0), Some(hash(1)));

        lease.rewind(0);
        assert_eq!(lease.unaccounted(0), None);
        assert_eq!(lease.resolve(0), 0);
        drop(lease);

        let mut lease = seq.lock(account()).await;
        lease.commit(0, hash(2));
        assert_eq!(lease.resolve(0), 1);
        assert_eq!(lease.unaccounted(0), Some(hash(2)));
    }

    #[tokio::test]
    async fn test_skip_past_refused_nonce() {
        let seq = NonceSequencer::new();
        let mut lease = seq.lock(account()).await;
        lease.skip_past(4);
        assert_eq!(lease.resolve(0), 5);
        assert_eq!(lease.unaccounted(0), None);

        lease.commit(5, hash(5));
        lease.skip_past(2);
        assert_eq!(lease.resolve(0), 6);
        assert_eq!(lease.unaccounted(0), Some(hash(5)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_leases_hand_out_unique_nonces() {
        let seq = Arc::new(NonceSequencer::new());
        // Stands in for a node whose pending count always lags behind.
        let node_pending = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let seq = seq.clone();
            let node_pending = node_pending.clone();
            handles.push(tokio::spawn(async move {
                let mut lease = seq.lock(account()).await;
                let nonce = lease.resolve(node_pending.load(Ordering::SeqCst));
                tokio::task::yield_now().await;
                lease.commit(nonce, B256::with_last_byte(nonce as u8));
                nonce
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()));
        }
        assert_eq!(seen.len(), 32);
        assert_eq!(seen.iter().max(), Some(&31));
    }
}
