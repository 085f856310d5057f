use crate::{Checkpoint, Epoch, Hash256, SignatureBytes, Slot};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash,
)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: u64,
    pub beacon_block_root: Hash256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

impl AttestationData {
    pub fn target_epoch(&self) -> Epoch {
        self.target.epoch
    }

    pub fn source_epoch(&self) -> Epoch {
        self.source.epoch
    }
}

/// A single attestation as gossiped and included in blocks.
///
/// The teacher's `Attestation<E>` carries a `BitList<E::MaxValidatorsPerCommittee>`
/// aggregation bitfield; committee membership is out of this core's scope (it consumes
/// already-resolved attesting indices), so the bitfield is kept as raw bytes here and the
/// resolved indices travel alongside it as an `IndexedAttestation` once verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Attestation {
    pub aggregation_bits: Vec<u8>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

/// An attestation whose aggregation bitfield has already been resolved to validator indices
/// and whose signature has been checked against those indices' pubkeys (or is pending a batch
/// check, see `state_processing::signature_sets`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct IndexedAttestation {
    pub attesting_indices: Vec<u64>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

impl IndexedAttestation {
    /// Casper-FFG surround vote check: `self` surrounds `other` if its source is older and its
    /// target is newer.
    pub fn surrounds(&self, other: &Self) -> bool {
        self.data.source_epoch() < other.data.source_epoch()
            && other.data.target_epoch() < self.data.target_epoch()
    }

    /// Casper-FFG double vote check: two distinct attestations targeting the same epoch.
    pub fn is_double_vote(&self, other: &Self) -> bool {
        self.data.target_epoch() == other.data.target_epoch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(source: u64, target: u64) -> IndexedAttestation {
        IndexedAttestation {
            attesting_indices: vec![0, 1, 2],
            data: AttestationData {
                slot: Slot::new(0),
                index: 0,
                beacon_block_root: Hash256::zero(),
                source: Checkpoint::new(Epoch::new(source), Hash256::zero()),
                target: Checkpoint::new(Epoch::new(target), Hash256::zero()),
            },
            signature: SignatureBytes::empty(),
        }
    }

    #[test]
    fn detects_surround() {
        let outer = att(0, 10);
        let inner = att(1, 9);
        assert!(outer.surrounds(&inner));
        assert!(!inner.surrounds(&outer));
    }

    #[test]
    fn detects_double_vote() {
        let a = att(0, 5);
        let b = att(1, 5);
        assert!(a.is_double_vote(&b));
    }
}
