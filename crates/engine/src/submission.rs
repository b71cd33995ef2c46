// Path: crates/engine/src/submission.rs
//! The nonce critical section: fetch nonce, build, sign, submit.

use crate::retry::RetryPolicy;
use ecopoints_api::ledger::LedgerNode;
use ecopoints_telemetry::ledger_metrics;
use ecopoints_tx::{NonceLease, NonceSequencer, Signer, TransactionBuilder};
use ecopoints_types::app::{Account, BlockTag, GasOverrides, RewardIntent, SignedTransaction};
use ecopoints_types::error::{NodeError, NodeRejection, RewardError};
use ecopoints_types::B256;
use std::sync::Arc;

const SEND_METHOD: &str = "eth_sendRawTransaction";

/// Sends award transactions from the single sending account.
pub struct Submitter {
    node: Arc<dyn LedgerNode>,
    builder: TransactionBuilder,
    signer: Signer,
    sequencer: NonceSequencer,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("sender", &self.signer.address())
            .field("contract", &self.builder.contract())
            .field("chain_id", &self.builder.chain_id())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Submitter {
    /// Creates a submitter. `signer` decides the sending account.
    pub fn new(
        node: Arc<dyn LedgerNode>,
        builder: TransactionBuilder,
        signer: Signer,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            node,
            builder,
            signer,
            sequencer: NonceSequencer::new(),
            retry,
        }
    }

    /// The sending account.
    pub fn sender(&self) -> Account {
        self.signer.address()
    }

    /// The transaction builder.
    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Builds, signs and submits `intent`, returning once the node has
    /// accepted the payload.
    ///
    /// `in_flight` is set to the hash of each payload before it is sent, so a
    /// caller that abandons this future knows whether anything may have
    /// reached the node. On error no nonce is consumed.
    pub async fn submit(
        &self,
        intent: &RewardIntent,
        gas: &GasOverrides,
        in_flight: &mut Option<B256>,
    ) -> Result<SignedTransaction, RewardError> {
        let mut lease = self.sequencer.lock(self.sender()).await;
        let max_attempts = self.retry.max_attempts();
        let mut signed = self.prepare(&mut lease, intent, gas).await?;
        let mut attempt = 0;

        loop {
            attempt += 1;
            *in_flight = Some(signed.hash());
            let err = match self.node.send_raw_transaction(signed.raw()).await {
                Ok(hash) if hash == signed.hash() => break,
                Ok(hash) => {
                    return Err(NodeError::Malformed(format!(
                        "node reported hash {} for transaction {}",
                        hash,
                        signed.hash()
                    ))
                    .into())
                }
                Err(e) => e,
            };

            match err.rejection() {
                Some(NodeRejection::AlreadyKnown) => {
                    tracing::debug!(
                        target: "submit",
                        hash = %signed.hash(),
                        "Node already holds transaction"
                    );
                    break;
                }
                Some(NodeRejection::NonceTooLow) if attempt < max_attempts => {
                    // An earlier attempt whose response was lost may have been mined.
                    if attempt > 1 && self.was_mined(&signed.hash()).await {
                        break;
                    }
                    tracing::warn!(
                        target: "nonce",
                        nonce = signed.nonce(),
                        attempt,
                        error = %err,
                        "Stale nonce, rebuilding transaction"
                    );
                    ledger_metrics().inc_node_retry(SEND_METHOD);
                    lease.skip_past(signed.nonce());
                    signed = self.prepare(&mut lease, intent, gas).await?;
                }
                Some(NodeRejection::NonceTooHigh) if attempt < max_attempts => {
                    tracing::warn!(
                        target: "nonce",
                        nonce = signed.nonce(),
                        attempt,
                        error = %err,
                        "Nonce gap, rebuilding from node count"
                    );
                    ledger_metrics().inc_node_retry(SEND_METHOD);
                    let pending = self.pending_nonce(lease.account()).await?;
                    lease.rewind(pending);
                    signed = self.prepare(&mut lease, intent, gas).await?;
                }
                _ if err.is_transient() && attempt < max_attempts => {
                    let pause = self.retry.backoff(attempt);
                    tracing::warn!(
                        target: "submit",
                        hash = %signed.hash(),
                        attempt,
                        max_attempts,
                        error = %err,
                        "Transient submission failure, resending"
                    );
                    ledger_metrics().inc_node_retry(SEND_METHOD);
                    tokio::time::sleep(pause).await;
                }
                _ => {
                    tracing::warn!(
                        target: "submit",
                        hash = %signed.hash(),
                        attempt,
                        error = %err,
                        "Submission failed"
                    );
                    return Err(err.into());
                }
            }
        }

        lease.commit(signed.nonce(), signed.hash());
        drop(lease);
        ledger_metrics().inc_awards_submitted();
        tracing::info!(
            target: "submit",
            hash = %signed.hash(),
            nonce = signed.nonce(),
            target_account = %intent.target,
            amount = intent.amount,
            attempts = attempt,
            "Submitted award"
        );
        Ok(signed)
    }

    async fn pending_nonce(&self, from: Account) -> Result<u64, RewardError> {
        Ok(self
            .retry
            .run("eth_getTransactionCount", || {
                self.node.transaction_count(from, BlockTag::Pending)
            })
            .await?)
    }

    async fn prepare(
        &self,
        lease: &mut NonceLease,
        intent: &RewardIntent,
        gas: &GasOverrides,
    ) -> Result<SignedTransaction, RewardError> {
        let from = lease.account();
        let pending = self.pending_nonce(from).await?;
        if let Some(last) = lease.unaccounted(pending) {
            // Neither pooled (by the node's count) nor mined: the node dropped it.
            match self.node.transaction_receipt(&last).await {
                Ok(Some(receipt)) if receipt.is_mined() => {}
                Ok(_) => lease.rewind(pending),
                Err(e) => {
                    tracing::debug!(
                        target: "nonce",
                        %from,
                        hash = %last,
                        error = %e,
                        "Could not check last submission, keeping local nonce"
                    );
                }
            }
        }
        let nonce = lease.resolve(pending);
        tracing::debug!(target: "nonce", %from, pending, nonce, "Resolved nonce");
        let unsigned = self.builder.build(intent, from, nonce, gas);
        Ok(self.signer.sign(&unsigned)?)
    }

    async fn was_mined(&self, hash: &B256) -> bool {
        matches!(
            self.node.transaction_receipt(hash).await,
            Ok(Some(receipt)) if receipt.is_mined()
        )
    }
}
