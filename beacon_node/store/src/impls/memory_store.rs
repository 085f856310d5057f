use crate::{column_key, DBColumn, Error, KeyValueStore, KeyValueStoreOp};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An entirely in-memory backend, used by tests and by `state_gen`'s ephemeral caches that don't
/// want a real on-disk database.
#[derive(Default)]
pub struct MemoryStore {
    db: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn open() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_bytes(&self, column: DBColumn, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.db.read().get(&column_key(column, key)).cloned())
    }

    fn put_bytes(&self, column: DBColumn, key: &[u8], value: &[u8]) -> Result<(), Error> {
        self.db.write().insert(column_key(column, key), value.to_vec());
        Ok(())
    }

    fn key_exists(&self, column: DBColumn, key: &[u8]) -> Result<bool, Error> {
        Ok(self.db.read().contains_key(&column_key(column, key)))
    }

    fn key_delete(&self, column: DBColumn, key: &[u8]) -> Result<(), Error> {
        self.db.write().remove(&column_key(column, key));
        Ok(())
    }

    fn do_atomically(&self, batch: Vec<KeyValueStoreOp>) -> Result<(), Error> {
        let mut db = self.db.write();
        for op in batch {
            match op {
                KeyValueStoreOp::PutKeyValue(column, key, value) => {
                    db.insert(column_key(column, &key), value);
                }
                KeyValueStoreOp::DeleteKey(column, key) => {
                    db.remove(&column_key(column, &key));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HasDbColumn, ItemStore, StoreItem};
    use ssz_derive::{Decode, Encode};

    #[derive(Debug, Clone, PartialEq, Encode, Decode)]
    struct Dummy(u64);

    impl HasDbColumn for Dummy {
        fn db_column() -> DBColumn {
            DBColumn::BeaconChain
        }
    }

    #[test]
    fn round_trips_typed_items() {
        let store = MemoryStore::open();
        let key = types::Hash256::from_slice(&[7; 32]);
        assert!(store.get_item::<Dummy>(&key).unwrap().is_none());

        store.put_item(&key, &Dummy(42)).unwrap();
        assert_eq!(store.get_item::<Dummy>(&key).unwrap(), Some(Dummy(42)));
        assert!(store.item_exists::<Dummy>(&key).unwrap());

        store.delete_item::<Dummy>(&key).unwrap();
        assert!(store.get_item::<Dummy>(&key).unwrap().is_none());
    }

    #[test]
    fn raw_bytes_are_column_isolated() {
        let store = MemoryStore::open();
        store.put_bytes(DBColumn::BeaconBlock, b"root", b"a").unwrap();
        store.put_bytes(DBColumn::BeaconState, b"root", b"b").unwrap();
        assert_eq!(store.get_bytes(DBColumn::BeaconBlock, b"root").unwrap(), Some(b"a".to_vec()));
        assert_eq!(store.get_bytes(DBColumn::BeaconState, b"root").unwrap(), Some(b"b".to_vec()));
    }
}
