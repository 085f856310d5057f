use crate::{BeaconBlockHeader, IndexedAttestation, SignedBeaconBlockHeader};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct ProposerSlashing {
    pub signed_header_1: SignedBeaconBlockHeader,
    pub signed_header_2: SignedBeaconBlockHeader,
}

impl ProposerSlashing {
    /// Two different headers signed by the same proposer for the same slot.
    pub fn is_slashable_offense(&self) -> bool {
        let h1 = &self.signed_header_1.message;
        let h2 = &self.signed_header_2.message;
        h1.slot == h2.slot && h1.proposer_index == h2.proposer_index && h1 != h2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

impl AttesterSlashing {
    /// Validator indices that are slashable as a result of this pair (present in both
    /// attestations' index sets, and the pair forms a double-vote or surround-vote).
    pub fn slashable_indices(&self) -> Vec<u64> {
        if !(self.attestation_1.is_double_vote(&self.attestation_2)
            || self.attestation_1.surrounds(&self.attestation_2)
            || self.attestation_2.surrounds(&self.attestation_1))
        {
            return Vec::new();
        }
        let set_2: std::collections::HashSet<_> =
            self.attestation_2.attesting_indices.iter().copied().collect();
        self.attestation_1
            .attesting_indices
            .iter()
            .copied()
            .filter(|i| set_2.contains(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Epoch, Hash256, SignatureBytes, Slot};

    fn header(slot: u64, proposer: u64, root: u8) -> BeaconBlockHeader {
        BeaconBlockHeader {
            slot: Slot::new(slot),
            proposer_index: proposer,
            parent_root: Hash256::zero(),
            state_root: Hash256::from_slice(&[root; 32]),
            body_root: Hash256::zero(),
        }
    }

    #[test]
    fn detects_double_proposal() {
        let slashing = ProposerSlashing {
            signed_header_1: SignedBeaconBlockHeader {
                message: header(10, 5, 1),
                signature: SignatureBytes::empty(),
            },
            signed_header_2: SignedBeaconBlockHeader {
                message: header(10, 5, 2),
                signature: SignatureBytes::empty(),
            },
        };
        assert!(slashing.is_slashable_offense());
    }

    fn att(indices: &[u64], source: u64, target: u64) -> IndexedAttestation {
        IndexedAttestation {
            attesting_indices: indices.to_vec(),
            data: crate::AttestationData {
                slot: Slot::new(0),
                index: 0,
                beacon_block_root: Hash256::zero(),
                source: crate::Checkpoint::new(Epoch::new(source), Hash256::zero()),
                target: crate::Checkpoint::new(Epoch::new(target), Hash256::zero()),
            },
            signature: SignatureBytes::empty(),
        }
    }

    #[test]
    fn slashable_indices_intersect_double_vote() {
        let slashing = AttesterSlashing {
            attestation_1: att(&[1, 2, 3], 0, 5),
            attestation_2: att(&[2, 3, 4], 1, 5),
        };
        let mut indices = slashing.slashable_indices();
        indices.sort_unstable();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn no_slashable_indices_when_not_conflicting() {
        let slashing = AttesterSlashing {
            attestation_1: att(&[1, 2], 0, 5),
            attestation_2: att(&[1, 2], 1, 6),
        };
        assert!(slashing.slashable_indices().is_empty());
    }
}
