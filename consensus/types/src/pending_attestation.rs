use crate::{AttestationData, Slot};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// An attestation that has been accepted into a block, recorded against the epoch it was seen
/// in rather than re-verified every epoch. `rewards_and_penalties` reads these back out to
/// credit attesters and the block proposer that included them.
///
/// `attesting_indices` is already resolved against the committee (committee/shuffling
/// computation is a validator-client concern, out of this core's scope), so epoch processing
/// never needs to re-derive a committee to know who attested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct PendingAttestation {
    pub attesting_indices: Vec<u64>,
    pub data: AttestationData,
    pub inclusion_delay: u64,
    pub proposer_index: u64,
}

impl PendingAttestation {
    pub fn slot(&self) -> Slot {
        self.data.slot
    }
}
