// Path: crates/engine/src/facade.rs
//! The reward ledger facade.

use crate::confirmation::ConfirmationPoller;
use crate::error::SetupError;
use crate::oracle::HttpVerificationOracle;
use crate::proofs::ProofRegistry;
use crate::retry::RetryPolicy;
use crate::setup;
use crate::submission::Submitter;
use ecopoints_api::crypto::KeyProvider;
use ecopoints_api::ledger::LedgerNode;
use ecopoints_api::oracle::VerificationOracle;
use ecopoints_client::HttpLedgerClient;
use ecopoints_telemetry::{error_metrics, ledger_metrics};
use ecopoints_tx::{Signer, TransactionBuilder};
use ecopoints_types::app::{
    validate, Account, BlockTag, CallRequest, GasOverrides, PointsBalance, ProofArtifact,
    RewardIntent, TransactionResult, Verdict,
};
use ecopoints_types::config::LedgerConfig;
use ecopoints_types::error::{ErrorCode, NodeError, OracleError, RewardError, ValidationError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Per-call options for an award.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwardOptions {
    /// Bounds both the wait for the nonce critical section and the
    /// confirmation poll.
    pub deadline: Option<Instant>,
    /// Per-call gas parameters.
    pub gas: GasOverrides,
}

impl AwardOptions {
    /// Options whose deadline is `timeout` from now. A timeout too large
    /// to represent leaves the award unbounded.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            gas: GasOverrides::default(),
        }
    }
}

pub(crate) async fn until<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Awards points and reads balances on the points contract.
pub struct RewardLedger {
    node: Arc<dyn LedgerNode>,
    submitter: Submitter,
    poller: ConfirmationPoller,
    retry: RetryPolicy,
    oracle: Option<Arc<dyn VerificationOracle>>,
    proofs: ProofRegistry,
}

impl std::fmt::Debug for RewardLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardLedger")
            .field("submitter", &self.submitter)
            .field("poller", &self.poller)
            .field("oracle", &self.oracle.is_some())
            .finish_non_exhaustive()
    }
}

impl RewardLedger {
    /// Connects to the configured node, loads the key and the ABI, and builds
    /// the oracle client if one is configured.
    pub async fn connect(config: &LedgerConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let node = Arc::new(HttpLedgerClient::new(
            &config.node.url,
            Duration::from_secs(config.node.request_timeout_secs),
        )?);
        let keys = setup::key_provider(&config.sender.key)?;
        let mut ledger = Self::from_parts(config, node, keys).await?;
        if let Some(oracle) = &config.oracle {
            ledger = ledger.with_oracle(Arc::new(HttpVerificationOracle::from_config(oracle)?));
        }
        Ok(ledger)
    }

    /// Assembles a ledger from a config and explicit node and key provider.
    pub async fn from_parts(
        config: &LedgerConfig,
        node: Arc<dyn LedgerNode>,
        keys: Arc<dyn KeyProvider>,
    ) -> Result<Self, SetupError> {
        let retry = RetryPolicy::from_config(&config.retry);
        let signer = Signer::for_account(keys, config.sender.address)?;
        let abi = setup::contract_abi(&config.contract)?;
        let chain_id = setup::chain_id(config.sender.chain_id, node.as_ref(), &retry).await?;
        let builder = TransactionBuilder::new(
            abi,
            config.contract.address,
            chain_id,
            config.gas.limit,
            u128::from(config.gas.price_wei),
        );
        tracing::info!(
            target: "ledger",
            sender = %signer.address(),
            contract = %config.contract.address,
            chain_id,
            "Reward ledger ready"
        );
        Ok(Self {
            submitter: Submitter::new(node.clone(), builder, signer, retry),
            poller: ConfirmationPoller::from_config(node.clone(), &config.confirmation),
            node,
            retry,
            oracle: None,
            proofs: ProofRegistry::new(),
        })
    }

    /// Uses `oracle` for [`RewardLedger::award_for_proof`].
    pub fn with_oracle(mut self, oracle: Arc<dyn VerificationOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// The account that signs and pays for every award.
    pub fn sender(&self) -> Account {
        self.submitter.sender()
    }

    /// The points contract.
    pub fn contract(&self) -> Account {
        self.submitter.builder().contract()
    }

    /// The chain id awards are bound to.
    pub fn chain_id(&self) -> u64 {
        self.submitter.builder().chain_id()
    }

    /// Awards `amount` points to `target_raw` and waits for confirmation.
    pub async fn award_points(
        &self,
        target_raw: &str,
        amount: u64,
    ) -> Result<TransactionResult, RewardError> {
        self.award_points_with(target_raw, amount, AwardOptions::default())
            .await
    }

    /// [`RewardLedger::award_points`] with a caller deadline and gas overrides.
    pub async fn award_points_with(
        &self,
        target_raw: &str,
        amount: u64,
        options: AwardOptions,
    ) -> Result<TransactionResult, RewardError> {
        let outcome = match validate(target_raw) {
            Ok(target) => self.award(RewardIntent::new(target, amount), options).await,
            Err(e) => Err(e.into()),
        };
        record(outcome)
    }

    /// Runs the verification oracle on `proof`, then awards on acceptance.
    ///
    /// A proof whose award is in flight or confirmed is refused with
    /// [`ValidationError::DuplicateProof`]. A proof whose award did not
    /// confirm may be submitted again.
    pub async fn award_for_proof(
        &self,
        proof: &ProofArtifact,
        target_raw: &str,
        amount: u64,
        options: AwardOptions,
    ) -> Result<TransactionResult, RewardError> {
        record(self.award_proven(proof, target_raw, amount, options).await)
    }

    /// Reads the current points balance of `target_raw` (`getPoints` at
    /// `latest`). Never signs, fetches a nonce or sends a transaction.
    pub async fn get_points(&self, target_raw: &str) -> Result<PointsBalance, RewardError> {
        record(self.read_points(target_raw).await)
    }

    async fn award_proven(
        &self,
        proof: &ProofArtifact,
        target_raw: &str,
        amount: u64,
        options: AwardOptions,
    ) -> Result<TransactionResult, RewardError> {
        let target = validate(target_raw)?;
        if proof.bytes.is_empty() {
            return Err(ValidationError::EmptyProof.into());
        }
        let claim = self.proofs.claim(proof.fingerprint())?;
        let oracle = self
            .oracle
            .as_ref()
            .ok_or(OracleError::NotConfigured)?;

        let verdict = match until(options.deadline, oracle.verify(proof)).await {
            Some(verdict) => verdict?,
            None => return Err(RewardError::TimedOut { hash: None }),
        };
        match verdict {
            Verdict::Accepted => ledger_metrics().inc_oracle_verdict("accepted"),
            Verdict::Rejected { reason } => {
                ledger_metrics().inc_oracle_verdict("rejected");
                tracing::info!(
                    target: "oracle",
                    proof = %claim.fingerprint(),
                    %reason,
                    "Proof rejected"
                );
                return Err(RewardError::OracleRejected { reason });
            }
        }

        let result = self.award(RewardIntent::new(target, amount), options).await?;
        claim.mark_awarded();
        Ok(result)
    }

    async fn award(
        &self,
        intent: RewardIntent,
        options: AwardOptions,
    ) -> Result<TransactionResult, RewardError> {
        let mut in_flight = None;
        let submitted = until(
            options.deadline,
            self.submitter.submit(&intent, &options.gas, &mut in_flight),
        )
        .await;
        let signed = match submitted {
            Some(result) => result?,
            None => {
                tracing::warn!(
                    target: "ledger",
                    hash = ?in_flight,
                    "Deadline expired before the node accepted the award"
                );
                ledger_metrics().inc_award_outcome("timed_out");
                return Err(RewardError::TimedOut { hash: in_flight });
            }
        };
        let outcome = self.poller.wait(signed.hash(), options.deadline).await;
        ledger_metrics().inc_award_outcome(match &outcome {
            Ok(result) => result.status().as_str(),
            Err(RewardError::Reverted(_)) => "reverted",
            Err(RewardError::TimedOut { .. }) => "timed_out",
            Err(_) => "failed",
        });
        outcome
    }

    async fn read_points(&self, target_raw: &str) -> Result<PointsBalance, RewardError> {
        let account = validate(target_raw)?;
        let abi = self.submitter.builder().abi();
        let request = CallRequest {
            from: None,
            to: self.contract(),
            data: abi.encode_get_points(account),
        };
        let output = self
            .retry
            .run("eth_call", || self.node.call(&request, BlockTag::Latest))
            .await?;
        let points = abi
            .decode_points(&output)
            .map_err(|e| NodeError::Malformed(format!("getPoints returned {}", e)))?;
        tracing::debug!(target: "ledger", %account, %points, "Read points balance");
        Ok(PointsBalance { account, points })
    }
}

fn record<T>(outcome: Result<T, RewardError>) -> Result<T, RewardError> {
    if let Err(e) = &outcome {
        error_metrics().inc_error(e.kind(), e.code());
        match e {
            RewardError::Validation(_) | RewardError::OracleRejected { .. } => {
                tracing::info!(target: "ledger", code = e.code(), error = %e, "Request refused")
            }
            _ => tracing::warn!(
                target: "ledger",
                code = e.code(),
                hash = ?e.transaction_hash(),
                error = %e,
                "Ledger operation failed"
            ),
        }
    }
    outcome
}
