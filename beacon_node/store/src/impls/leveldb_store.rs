use crate::{DBColumn, Error, KeyValueStore, KeyValueStoreOp};
use db_key::Key;
use leveldb::batch::{Batch, Writebatch};
use leveldb::database::kv::KV;
use leveldb::database::Database;
use leveldb::options::{Options, ReadOptions, WriteOptions};
use parking_lot::Mutex;
use std::path::Path;

/// LevelDB has no notion of columns; every key is prefixed with its column's code (see
/// `column_key`) before it reaches the DB, so `BytesKey` just wraps the already-prefixed bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BytesKey(Vec<u8>);

impl Key for BytesKey {
    fn from_u8(key: &[u8]) -> Self {
        BytesKey(key.to_vec())
    }

    fn as_slice<T, F: Fn(&[u8]) -> T>(&self, f: F) -> T {
        f(&self.0)
    }
}

/// Production backend: an on-disk LevelDB database. Writes are serialized behind a mutex so
/// `do_atomically` can offer all-or-nothing semantics even though the underlying `leveldb` crate
/// does not expose a transaction API beyond `Writebatch`.
pub struct LevelDB {
    db: Database<BytesKey>,
    transaction_mutex: Mutex<()>,
}

impl LevelDB {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let mut options = Options::new();
        options.create_if_missing = true;

        let db = Database::open(path, options)?;
        Ok(Self { db, transaction_mutex: Mutex::new(()) })
    }

    fn read_options(&self) -> ReadOptions<BytesKey> {
        ReadOptions::new()
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions::new()
    }
}

impl KeyValueStore for LevelDB {
    fn get_bytes(&self, column: DBColumn, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        let column_key = crate::column_key(column, key);
        self.db
            .get(self.read_options(), BytesKey(column_key))
            .map_err(Error::from)
    }

    fn put_bytes(&self, column: DBColumn, key: &[u8], value: &[u8]) -> Result<(), Error> {
        let column_key = crate::column_key(column, key);
        self.db
            .put(self.write_options(), BytesKey(column_key), value)
            .map_err(Error::from)
    }

    fn key_exists(&self, column: DBColumn, key: &[u8]) -> Result<bool, Error> {
        Ok(self.get_bytes(column, key)?.is_some())
    }

    fn key_delete(&self, column: DBColumn, key: &[u8]) -> Result<(), Error> {
        let column_key = crate::column_key(column, key);
        self.db
            .delete(self.write_options(), BytesKey(column_key))
            .map_err(Error::from)
    }

    fn do_atomically(&self, batch: Vec<KeyValueStoreOp>) -> Result<(), Error> {
        let _guard = self.transaction_mutex.lock();
        let mut write_batch: Writebatch<BytesKey> = Writebatch::new();

        for op in batch {
            match op {
                KeyValueStoreOp::PutKeyValue(column, key, value) => {
                    write_batch.put(BytesKey(crate::column_key(column, &key)), &value);
                }
                KeyValueStoreOp::DeleteKey(column, key) => {
                    write_batch.delete(BytesKey(crate::column_key(column, &key)));
                }
            }
        }

        self.db.write(self.write_options(), &write_batch).map_err(Error::from)
    }
}
