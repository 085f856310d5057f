use crate::{singleton_key, DBColumn, Error, HasDbColumn, KeyValueStore};
use ssz::{Decode, Encode};
use ssz_derive::{Decode as SszDecode, Encode as SszEncode};
use types::{BeaconState, Checkpoint, Hash256, SignedBeaconBlock, Slot};

impl HasDbColumn for SignedBeaconBlock {
    fn db_column() -> DBColumn {
        DBColumn::BeaconBlock
    }
}

impl HasDbColumn for BeaconState {
    fn db_column() -> DBColumn {
        DBColumn::BeaconState
    }
}

/// The `state_summaries[root] -> {root, slot}` entry: enough to locate a state's replay anchor
/// without paying to load the full `BeaconState`.
#[derive(Debug, Clone, Copy, PartialEq, SszEncode, SszDecode)]
pub struct BeaconStateSummary {
    pub root: Hash256,
    pub slot: Slot,
}

impl HasDbColumn for BeaconStateSummary {
    fn db_column() -> DBColumn {
        DBColumn::BeaconStateSummary
    }
}

/// The four singleton entries of the `BeaconChain` column, each keyed by its own name rather
/// than a root: there is exactly one live value of each at a time.
macro_rules! singleton_accessor {
    ($get:ident, $put:ident, $name:expr, $ty:ty) => {
        pub fn $get<KV: KeyValueStore>(kv: &KV) -> Result<Option<$ty>, Error> {
            match kv.get_bytes(DBColumn::BeaconChain, &singleton_key($name))? {
                Some(bytes) => Ok(Some(<$ty>::from_ssz_bytes(&bytes)?)),
                None => Ok(None),
            }
        }

        pub fn $put<KV: KeyValueStore>(kv: &KV, value: &$ty) -> Result<(), Error> {
            kv.put_bytes(DBColumn::BeaconChain, &singleton_key($name), &value.as_ssz_bytes())
        }
    };
}

singleton_accessor!(get_finalized_checkpoint, put_finalized_checkpoint, "finalized_checkpoint", Checkpoint);
singleton_accessor!(get_head_block_root, put_head_block_root, "head_block_root", Hash256);
singleton_accessor!(get_genesis_block_root, put_genesis_block_root, "genesis_block_root", Hash256);
singleton_accessor!(get_last_archived_index, put_last_archived_index, "last_archived_index", u64);
