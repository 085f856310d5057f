use crate::{Hash256, PublicKeyBytes, SignatureBytes};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash,
)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub amount: u64,
    pub signature: SignatureBytes,
}

/// A deposit plus its Merkle proof against the eth1 deposit root.
///
/// Verifying `proof` against `state.eth1_data.deposit_root` is out of this core's scope (the
/// deposit contract/eth1 bridge is an external collaborator per `spec.md` §1); the proof is
/// still carried on the wire type since it is part of the SSZ-hashed block body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Deposit {
    pub proof: Vec<Hash256>,
    pub data: DepositData,
}
