use crate::{Hash256, SignatureBytes, Slot};
use eth2_hashing::hash;
use serde_derive::{Deserialize, Serialize};
use ssz::Encode;
use ssz_derive::{Decode, Encode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// A header of a `BeaconBlock`, small enough to gossip and store cheaply on its own
/// (used by `ProposerSlashing` to prove a double proposal without shipping both full bodies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body_root: Hash256,
}

impl BeaconBlockHeader {
    pub fn canonical_root(&self) -> Hash256 {
        Hash256::from_slice(&self.tree_hash_root()[..])
    }

    /// Hashes `self` together with a domain separation tag, mirroring the `SignedRoot` used to
    /// build signing roots. Consensus-critical only in that callers must use this rather than
    /// `canonical_root()` when verifying a proposer signature.
    pub fn signing_root(&self, domain: [u8; 32]) -> Hash256 {
        let mut bytes = self.as_ssz_bytes();
        bytes.extend_from_slice(&domain);
        Hash256::from_slice(&hash(&bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: SignatureBytes,
}
