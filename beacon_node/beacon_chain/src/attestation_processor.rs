use parking_lot::RwLock;
use state_processing::common::{get_indexed_attestation, is_valid_indexed_attestation};
use std::collections::HashMap;
use types::{Attestation, Epoch, IndexedAttestation};

use crate::errors::BeaconChainError;

/// `AttestationProcessor` of §2: resolves a gossiped `Attestation`'s aggregation bitfield into
/// validator indices (caller supplies the committee — duty scheduling is out of scope per §1),
/// then validates it before it is allowed anywhere near `ForkChoice::on_attestation`.
///
/// The surround/double-vote check mirrors slashing protection rather than re-deriving it from
/// scratch: each validator's last-seen `(source_epoch, target_epoch)` is kept so scenario S4 can
/// reject a surrounding vote at the validation stage rather than in fork choice.
pub struct AttestationProcessor {
    last_votes: RwLock<HashMap<u64, (Epoch, Epoch)>>,
}

impl Default for AttestationProcessor {
    fn default() -> Self {
        Self { last_votes: RwLock::new(HashMap::new()) }
    }
}

impl AttestationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `attestation` against `committee` and runs structural + slashing-protection
    /// checks. Returns the `IndexedAttestation` ready for `ForkChoice::on_attestation` on success.
    pub fn verify(&self, attestation: &Attestation, committee: &[u64]) -> Result<IndexedAttestation, BeaconChainError> {
        let indexed = get_indexed_attestation(committee, attestation)?;
        is_valid_indexed_attestation(&indexed)?;
        self.check_not_slashable(&indexed)?;
        Ok(indexed)
    }

    fn check_not_slashable(&self, indexed: &IndexedAttestation) -> Result<(), BeaconChainError> {
        let source_epoch = indexed.data.source_epoch();
        let target_epoch = indexed.data.target_epoch();
        let votes = self.last_votes.read();
        for &validator_index in &indexed.attesting_indices {
            if let Some(&(prev_source, prev_target)) = votes.get(&validator_index) {
                let is_double_vote = prev_target == target_epoch;
                let is_surround = (prev_source < source_epoch && target_epoch < prev_target)
                    || (source_epoch < prev_source && prev_target < target_epoch);
                if is_double_vote || is_surround {
                    return Err(BeaconChainError::SlashableAttestation { validator_index });
                }
            }
        }
        Ok(())
    }

    /// Records `indexed`'s `(source, target)` as every attesting validator's latest vote. Called
    /// only once `verify` has accepted the attestation.
    pub fn record(&self, indexed: &IndexedAttestation) {
        let mut votes = self.last_votes.write();
        for &validator_index in &indexed.attesting_indices {
            votes.insert(validator_index, (indexed.data.source_epoch(), indexed.data.target_epoch()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{AttestationData, Checkpoint, Hash256, SignatureBytes, Slot};

    fn attestation(source: u64, target: u64, bits: Vec<u8>) -> Attestation {
        Attestation {
            aggregation_bits: bits,
            data: AttestationData {
                slot: Slot::new(target * 8),
                index: 0,
                beacon_block_root: Hash256::zero(),
                source: Checkpoint::new(Epoch::new(source), Hash256::zero()),
                target: Checkpoint::new(Epoch::new(target), Hash256::zero()),
            },
            signature: SignatureBytes::empty(),
        }
    }

    #[test]
    fn rejects_surrounding_vote() {
        let processor = AttestationProcessor::new();
        let committee = vec![7];

        let first = attestation(2, 5, vec![0b1]);
        let indexed = processor.verify(&first, &committee).unwrap();
        processor.record(&indexed);

        let surrounding = attestation(1, 6, vec![0b1]);
        let err = processor.verify(&surrounding, &committee).unwrap_err();
        assert!(matches!(err, BeaconChainError::SlashableAttestation { validator_index: 7 }));
    }

    #[test]
    fn accepts_non_overlapping_progression() {
        let processor = AttestationProcessor::new();
        let committee = vec![7];

        let first = attestation(2, 5, vec![0b1]);
        let indexed = processor.verify(&first, &committee).unwrap();
        processor.record(&indexed);

        let next = attestation(5, 6, vec![0b1]);
        assert!(processor.verify(&next, &committee).is_ok());
    }
}
