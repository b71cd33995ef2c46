// Path: crates/types/src/app/reward.rs
//! Reward intents, transaction results and oracle verdicts.

use super::account::Account;
use crate::error::TransitionError;
use alloy_primitives::{keccak256, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An instruction to award `amount` points to `target`.
///
/// Created once per verified eco-action and consumed when it resolves to a
/// [`TransactionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardIntent {
    /// The account receiving the points.
    pub target: Account,
    /// The number of points to award, encoded on-chain as `uint256`.
    pub amount: u64,
}

impl RewardIntent {
    /// Creates a new intent.
    pub fn new(target: Account, amount: u64) -> Self {
        Self { target, amount }
    }
}

/// The lifecycle status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Accepted by the node, inclusion not yet observed.
    Pending,
    /// Included in a block and the contract call succeeded.
    Confirmed,
    /// Included in a block but the contract call reverted; no points were awarded.
    Reverted,
    /// Abandoned after submission for a reason other than a revert.
    Failed,
}

impl TxStatus {
    /// Returns `true` for every status except `Pending`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }

    /// A stable lowercase label, used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Reverted => "reverted",
            TxStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The observable outcome of one award operation.
///
/// Created as `Pending` at submission. Only the confirmation manager moves it
/// forward, and once terminal it never changes again: the transition methods
/// return `false` and leave the value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    hash: B256,
    status: TxStatus,
    block_number: Option<u64>,
}

impl TransactionResult {
    /// A freshly submitted transaction.
    pub fn pending(hash: B256) -> Self {
        Self {
            hash,
            status: TxStatus::Pending,
            block_number: None,
        }
    }

    /// The transaction hash.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// The current status.
    pub fn status(&self) -> TxStatus {
        self.status
    }

    /// The including block, once known.
    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    /// Returns `true` once the result can no longer change.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Marks the transaction as included with a successful call.
    pub fn confirm(&mut self, block_number: u64) -> Result<(), TransitionError> {
        self.settle(TxStatus::Confirmed, Some(block_number))
    }

    /// Marks the transaction as included with a reverted call.
    pub fn revert(&mut self, block_number: u64) -> Result<(), TransitionError> {
        self.settle(TxStatus::Reverted, Some(block_number))
    }

    /// Marks the transaction as failed.
    pub fn fail(&mut self) -> Result<(), TransitionError> {
        self.settle(TxStatus::Failed, self.block_number)
    }

    /// Moves a pending result to `status`. A terminal result is left untouched.
    fn settle(
        &mut self,
        status: TxStatus,
        block_number: Option<u64>,
    ) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError {
                hash: self.hash,
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.block_number = block_number;
        Ok(())
    }
}

/// A read-only projection of one account's points on the ledger.
///
/// Never cached: every read re-queries the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBalance {
    /// The queried account.
    pub account: Account,
    /// The balance reported by `getPoints`.
    pub points: U256,
}

/// A proof of an eco-friendly action, handed to the verification oracle.
#[derive(Clone, PartialEq, Eq)]
pub struct ProofArtifact {
    /// The raw proof bytes (typically an image).
    pub bytes: Vec<u8>,
    /// The MIME type, if the caller knows it.
    pub content_type: Option<String>,
    /// The original file name, if any.
    pub file_name: Option<String>,
}

impl ProofArtifact {
    /// Wraps raw proof bytes with no metadata.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
            file_name: None,
        }
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the original file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// A content fingerprint used to recognise resubmissions of the same proof.
    pub fn fingerprint(&self) -> B256 {
        keccak256(&self.bytes)
    }
}

impl fmt::Debug for ProofArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofArtifact")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// The oracle's judgement of a proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    /// The proof shows a valid eco-friendly action.
    Accepted,
    /// The proof was examined and found invalid.
    Rejected {
        /// Why the proof was rejected.
        reason: String,
    },
}

impl Verdict {
    /// Returns `true` for [`Verdict::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_is_immutable_once_terminal() {
        let mut result = TransactionResult::pending(B256::repeat_byte(0xab));
        assert!(!result.is_terminal());
        result.confirm(7).unwrap();
        assert_eq!(result.status(), TxStatus::Confirmed);
        assert_eq!(result.block_number(), Some(7));

        let refused = result.revert(8).unwrap_err();
        assert_eq!(refused.from, TxStatus::Confirmed);
        assert_eq!(refused.to, TxStatus::Reverted);
        assert_eq!(refused.hash, result.hash());
        assert_eq!(result.fail().unwrap_err().to, TxStatus::Failed);
        assert_eq!(result.status(), TxStatus::Confirmed);
        assert_eq!(result.block_number(), Some(7));
    }

    #[test]
    fn test_reverted_keeps_hash() {
        let hash = B256::repeat_byte(0x11);
        let mut result = TransactionResult::pending(hash);
        result.revert(3).unwrap();
        assert_eq!(result.hash(), hash);
        assert_eq!(result.status(), TxStatus::Reverted);
    }

    #[test]
    fn test_proof_debug_omits_bytes() {
        let proof = ProofArtifact::new(vec![0xde, 0xad, 0xbe, 0xef])
            .with_content_type("image/jpeg")
            .with_file_name("bottles.jpg");
        let rendered = format!("{:?}", proof);
        assert!(rendered.contains("len: 4"));
        assert!(rendered.contains("bottles.jpg"));
        assert!(!rendered.contains("222"));
        assert_eq!(proof.fingerprint(), keccak256([0xde, 0xad, 0xbe, 0xef]));
    }
}
