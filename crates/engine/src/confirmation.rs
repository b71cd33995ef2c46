// Path: crates/engine/src/confirmation.rs
//! Polls for the receipt of a submitted transaction.

use crate::facade::until;
use ecopoints_api::ledger::LedgerNode;
use ecopoints_telemetry::ledger_metrics;
use ecopoints_types::app::{TransactionReceipt, TransactionResult};
use ecopoints_types::config::ConfirmationConfig;
use ecopoints_types::error::{NodeError, RewardError};
use ecopoints_types::B256;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Waits for submitted transactions to be mined.
pub struct ConfirmationPoller {
    node: Arc<dyn LedgerNode>,
    poll_interval: Duration,
    timeout: Duration,
}

impl std::fmt::Debug for ConfirmationPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationPoller")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ConfirmationPoller {
    /// Polls every `poll_interval` for at most `timeout`.
    pub fn new(node: Arc<dyn LedgerNode>, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            node,
            poll_interval,
            timeout,
        }
    }

    /// Builds the poller from the `[confirmation]` config section.
    pub fn from_config(node: Arc<dyn LedgerNode>, config: &ConfirmationConfig) -> Self {
        Self::new(node, config.poll_interval(), config.timeout())
    }

    /// Waits for `hash` to be mined, but no longer than the configured
    /// timeout or `deadline`, whichever comes first.
    ///
    /// Returns the confirmed result, [`RewardError::Reverted`] for a mined
    /// call that reverted, or [`RewardError::TimedOut`] carrying the hash.
    /// The transaction is never resubmitted.
    pub async fn wait(
        &self,
        hash: B256,
        deadline: Option<Instant>,
    ) -> Result<TransactionResult, RewardError> {
        let started = Instant::now();
        let end = earliest(started.checked_add(self.timeout), deadline);

        let mut result = TransactionResult::pending(hash);
        let mut polls: u64 = 0;
        loop {
            polls += 1;
            match until(end, self.node.transaction_receipt(&hash)).await {
                None => break,
                Some(Ok(Some(receipt))) if receipt.is_mined() => {
                    ledger_metrics()
                        .observe_confirmation_latency(started.elapsed().as_secs_f64());
                    return resolve(&mut result, &receipt);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    // The payload has a hash, so every failure here ends in
                    // TimedOut at worst and the caller keeps the hash.
                    tracing::warn!(
                        target: "confirm",
                        %hash,
                        poll = polls,
                        transient = e.is_transient(),
                        error = %e,
                        "Receipt poll failed"
                    );
                }
            }

            let now = Instant::now();
            match end {
                Some(end) if now >= end => break,
                Some(end) => {
                    let wake = now.checked_add(self.poll_interval).map_or(end, |w| w.min(end));
                    tokio::time::sleep_until(wake).await;
                }
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }

        tracing::warn!(
            target: "confirm",
            %hash,
            polls,
            waited_ms = started.elapsed().as_millis() as u64,
            "No receipt before timeout"
        );
        Err(RewardError::TimedOut { hash: Some(hash) })
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn resolve(
    result: &mut TransactionResult,
    receipt: &TransactionReceipt,
) -> Result<TransactionResult, RewardError> {
    let hash = result.hash();
    let Some(block) = receipt.block_number else {
        return Err(NodeError::Malformed(format!("receipt for {} has no block", hash)).into());
    };
    match receipt.status {
        Some(1) => {
            result.confirm(block)?;
            tracing::info!(target: "confirm", %hash, block, "Transaction confirmed");
            Ok(result.clone())
        }
        Some(0) => {
            result.revert(block)?;
            tracing::warn!(target: "confirm", %hash, block, "Transaction reverted");
            Err(RewardError::Reverted(result.clone()))
        }
        other => {
            result.fail()?;
            tracing::error!(target: "confirm", %hash, block, status = ?other, "Receipt has no usable status");
            Err(NodeError::Malformed(format!(
                "receipt for {} has status {:?}",
                hash, other
            ))
            .into())
        }
    }
}
