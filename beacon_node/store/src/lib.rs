//! The on-disk schema: a handful of flat key-value namespaces (`DBColumn`s), a pair of
//! `KeyValueStore` backends (LevelDB for production, an in-memory `HashMap` for tests), and the
//! `StoreItem`/`ItemStore` glue that (de)serializes domain types to bytes via SSZ.
//!
//! Hot/cold tiering and replay live one layer up, in `state_gen` — this crate only knows how to
//! get and put bytes under a key.

mod errors;
mod impls;
mod schema;

pub use errors::Error;
pub use impls::leveldb_store::LevelDB;
pub use impls::memory_store::MemoryStore;
pub use schema::{
    get_finalized_checkpoint, get_genesis_block_root, get_head_block_root, get_last_archived_index,
    put_finalized_checkpoint, put_genesis_block_root, put_head_block_root, put_last_archived_index,
    BeaconStateSummary,
};

use ssz::{Decode, Encode};
use std::borrow::Cow;
use types::Hash256;

/// One of the flat namespaces listed in the external-interfaces section of the schema: every key
/// actually written to the backing store is prefixed with its column's two-byte code, so a single
/// flat keyspace (as LevelDB provides) can still emulate several logical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DBColumn {
    BeaconBlock,
    BeaconState,
    BeaconStateSummary,
    /// Singleton values: `finalized_checkpoint`, `head_block_root`, `genesis_block_root`,
    /// `last_archived_index`, each stored under a column-specific fixed key.
    BeaconChain,
    BeaconArchivedPointRoot,
    BeaconArchivedPointState,
    ValidatorIndex,
    CanonicalSlot,
}

impl DBColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            DBColumn::BeaconBlock => "blk",
            DBColumn::BeaconState => "ste",
            DBColumn::BeaconStateSummary => "ssu",
            DBColumn::BeaconChain => "bch",
            DBColumn::BeaconArchivedPointRoot => "apr",
            DBColumn::BeaconArchivedPointState => "aps",
            DBColumn::ValidatorIndex => "vin",
            DBColumn::CanonicalSlot => "csl",
        }
    }
}

/// A column-prefixed key, written `<column><key>` so backends with a single flat keyspace still
/// get namespace isolation.
fn column_key(column: DBColumn, key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + key.len());
    out.extend_from_slice(column.as_str().as_bytes());
    out.extend_from_slice(key);
    out
}

/// A raw get/put/delete key-value store, oblivious to what's stored in it. Both backends are
/// internally synchronised so a `&self` suffices for writers.
pub trait KeyValueStore: Sync + Send + Sized {
    fn get_bytes(&self, column: DBColumn, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;
    fn put_bytes(&self, column: DBColumn, key: &[u8], value: &[u8]) -> Result<(), Error>;
    fn key_exists(&self, column: DBColumn, key: &[u8]) -> Result<bool, Error>;
    fn key_delete(&self, column: DBColumn, key: &[u8]) -> Result<(), Error>;
    /// Applies every op in `batch` as a single atomic write.
    fn do_atomically(&self, batch: Vec<KeyValueStoreOp>) -> Result<(), Error>;
}

/// One write queued for `KeyValueStore::do_atomically`.
pub enum KeyValueStoreOp {
    PutKeyValue(DBColumn, Vec<u8>, Vec<u8>),
    DeleteKey(DBColumn, Vec<u8>),
}

/// A domain type that can be persisted verbatim under a single `DBColumn`. Backed by SSZ, since
/// that's the wire format every type in this tree already implements `Encode`/`Decode` for.
pub trait StoreItem: Sized {
    fn db_column() -> DBColumn;
    fn as_store_bytes(&self) -> Vec<u8>;
    fn from_store_bytes(bytes: &[u8]) -> Result<Self, Error>;
}

impl<T: Encode + Decode> StoreItem for T
where
    T: HasDbColumn,
{
    fn db_column() -> DBColumn {
        <T as HasDbColumn>::db_column()
    }

    fn as_store_bytes(&self) -> Vec<u8> {
        self.as_ssz_bytes()
    }

    fn from_store_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_ssz_bytes(bytes).map_err(Into::into)
    }
}

/// Pins an SSZ type to the column it lives in, so the blanket `StoreItem` impl above can pick it
/// up without every call site having to name the column.
pub trait HasDbColumn {
    fn db_column() -> DBColumn;
}

/// `Hash256`-keyed typed access on top of a raw `KeyValueStore`, for columns whose key is always
/// a 32-byte root (`blocks`, `states`, `state_summaries`).
pub trait ItemStore: KeyValueStore {
    fn get_item<I: StoreItem>(&self, key: &Hash256) -> Result<Option<I>, Error> {
        match self.get_bytes(I::db_column(), key.as_bytes())? {
            Some(bytes) => Ok(Some(I::from_store_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_item<I: StoreItem>(&self, key: &Hash256, item: &I) -> Result<(), Error> {
        self.put_bytes(I::db_column(), key.as_bytes(), &item.as_store_bytes())
    }

    fn item_exists<I: StoreItem>(&self, key: &Hash256) -> Result<bool, Error> {
        self.key_exists(I::db_column(), key.as_bytes())
    }

    fn delete_item<I: StoreItem>(&self, key: &Hash256) -> Result<(), Error> {
        self.key_delete(I::db_column(), key.as_bytes())
    }
}

impl<KV: KeyValueStore> ItemStore for KV {}

/// A fixed, type-level key for the `BeaconChain` column's singleton entries: `finalized_checkpoint`,
/// `head_block_root`, `genesis_block_root`, `last_archived_index` all live under a key equal to
/// their own name, distinguishing them within the shared column.
pub fn singleton_key(name: &str) -> Cow<'static, [u8]> {
    Cow::Owned(name.as_bytes().to_vec())
}

pub fn index_key(index: u64) -> [u8; 8] {
    index.to_be_bytes()
}
