// Path: crates/test_utils/src/oracle.rs
//! Scripted verification oracles.

use async_trait::async_trait;
use ecopoints_api::oracle::VerificationOracle;
use ecopoints_types::app::{ProofArtifact, Verdict};
use ecopoints_types::error::OracleError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// An oracle that returns the same answer for every proof and counts calls.
#[derive(Debug)]
pub struct StaticOracle {
    answer: Result<Verdict, OracleError>,
    calls: AtomicU64,
    last_proof: Mutex<Option<ProofArtifact>>,
}

impl StaticOracle {
    /// Always answers `answer`.
    pub fn new(answer: Result<Verdict, OracleError>) -> Self {
        Self {
            answer,
            calls: AtomicU64::new(0),
            last_proof: Mutex::new(None),
        }
    }

    /// Accepts every proof.
    pub fn accepting() -> Self {
        Self::new(Ok(Verdict::Accepted))
    }

    /// Rejects every proof with `reason`.
    pub fn rejecting(reason: &str) -> Self {
        Self::new(Ok(Verdict::Rejected {
            reason: reason.to_string(),
        }))
    }

    /// Fails every verification with `error`.
    pub fn failing(error: OracleError) -> Self {
        Self::new(Err(error))
    }

    /// Number of proofs submitted so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent proof submitted.
    pub fn last_proof(&self) -> Option<ProofArtifact> {
        self.last_proof
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl VerificationOracle for StaticOracle {
    async fn verify(&self, proof: &ProofArtifact) -> Result<Verdict, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_proof.lock().unwrap_or_else(PoisonError::into_inner) = Some(proof.clone());
        self.answer.clone()
    }
}
