use crate::Hash256;
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A `slots_per_historical_root`-long snapshot of `block_roots`/`state_roots`, hashed and
/// appended to `historical_roots` once per `slots_per_historical_root` worth of epochs. The
/// rolling arrays themselves are overwritten every `slots_per_historical_root` slots, so this
/// batch is the only durable record of what they held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct HistoricalBatch {
    pub block_roots: Vec<Hash256>,
    pub state_roots: Vec<Hash256>,
}
