// Path: crates/api/src/oracle/mod.rs
//! Defines the verification oracle that classifies proofs of eco-actions.

use crate::error::OracleError;
use async_trait::async_trait;
use ecopoints_types::app::{ProofArtifact, Verdict};

/// An external classifier that judges whether a proof shows a valid
/// eco-friendly action.
///
/// A returned [`Verdict::Rejected`] is a judgement about the proof. An
/// `Err` means the judgement could not be made at all, and leaves the caller
/// free to try again later.
#[async_trait]
pub trait VerificationOracle: Send + Sync {
    /// Classifies one proof.
    async fn verify(&self, proof: &ProofArtifact) -> Result<Verdict, OracleError>;
}
