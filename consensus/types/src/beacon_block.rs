use crate::{
    Attestation, AttesterSlashing, Deposit, Eth1Data, Hash256, ProposerSlashing, SignatureBytes,
    SignedVoluntaryExit, Slot,
};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// The operations carried by a block.
///
/// The teacher bounds each list with a `VariableList<_, E::MaxFoo>` typenum so the cap is
/// enforced at the SSZ layer; since `EthSpec` here is a plain trait rather than a `typenum`
/// parameter pack (see `eth_spec.rs`), the per-block caps from `ChainSpec` are instead enforced
/// explicitly in `per_block_processing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconBlockBody {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Eth1Data,
    pub graffiti: [u8; 32],
    pub proposer_slashings: Vec<ProposerSlashing>,
    pub attester_slashings: Vec<AttesterSlashing>,
    pub attestations: Vec<Attestation>,
    pub deposits: Vec<Deposit>,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

impl BeaconBlockBody {
    pub fn empty(eth1_data: Eth1Data) -> Self {
        Self {
            randao_reveal: SignatureBytes::empty(),
            eth1_data,
            graffiti: [0; 32],
            proposer_slashings: vec![],
            attester_slashings: vec![],
            attestations: vec![],
            deposits: vec![],
            voluntary_exits: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    pub fn canonical_root(&self) -> Hash256 {
        Hash256::from_slice(&self.tree_hash_root()[..])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: SignatureBytes,
}

impl SignedBeaconBlock {
    pub fn canonical_root(&self) -> Hash256 {
        self.message.canonical_root()
    }

    pub fn slot(&self) -> Slot {
        self.message.slot
    }

    pub fn parent_root(&self) -> Hash256 {
        self.message.parent_root
    }
}
