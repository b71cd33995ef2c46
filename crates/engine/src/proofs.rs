// Path: crates/engine/src/proofs.rs
//! Guards against awarding the same proof twice within one process.

use dashmap::DashSet;
use ecopoints_types::error::ValidationError;
use ecopoints_types::B256;

/// Proof fingerprints whose award is in flight or confirmed.
#[derive(Debug, Default)]
pub struct ProofRegistry {
    claims: DashSet<B256>,
}

impl ProofRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `fingerprint` for one award attempt.
    ///
    /// Fails with [`ValidationError::DuplicateProof`] while another award for
    /// the same proof is in flight, or after one was confirmed.
    pub fn claim(&self, fingerprint: B256) -> Result<ProofClaim<'_>, ValidationError> {
        if !self.claims.insert(fingerprint) {
            return Err(ValidationError::DuplicateProof(fingerprint));
        }
        Ok(ProofClaim {
            registry: self,
            fingerprint,
            awarded: false,
        })
    }
}

/// A reservation of one proof fingerprint.
///
/// Dropping the claim without [`ProofClaim::mark_awarded`] releases the
/// proof so it can be submitted again.
#[derive(Debug)]
pub struct ProofClaim<'a> {
    registry: &'a ProofRegistry,
    fingerprint: B256,
    awarded: bool,
}

impl ProofClaim<'_> {
    /// The reserved fingerprint.
    pub fn fingerprint(&self) -> B256 {
        self.fingerprint
    }

    /// Keeps the proof reserved for the lifetime of the process.
    pub fn mark_awarded(mut self) {
        self.awarded = true;
    }
}

impl Drop for ProofClaim<'_> {
    fn drop(&mut self) {
        if !self.awarded {
            self.registry.claims.remove(&self.fingerprint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_release_and_award() {
        let registry = ProofRegistry::new();
        let fp = B256::repeat_byte(7);

        let claim = registry.claim(fp).unwrap();
        assert!(matches!(
            registry.claim(fp),
            Err(ValidationError::DuplicateProof(dup)) if dup == fp
        ));
        // Released on drop.
        drop(claim);
        let claim = registry.claim(fp).unwrap();

        claim.mark_awarded();
        assert!(matches!(
            registry.claim(fp),
            Err(ValidationError::DuplicateProof(_))
        ));

        // Unrelated proofs are unaffected.
        assert!(registry.claim(B256::repeat_byte(8)).is_ok());
    }
}
