use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

use super::key::RecordKey;

/// The single logical record store backing every election in a ledger.
///
/// Records are stored as serialized documents under their derived keys. One
/// mutex guards the whole map, so each transaction is a critical section and
/// every operation observes a total order over the record set.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Mutex<HashMap<RecordKey, Vec<u8>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` as one atomic transaction.
    ///
    /// Writes made by `op` are staged inside the [`Transaction`] and merged
    /// into the store only when `op` returns `Ok`; any error discards the
    /// staged writes and leaves the store untouched. Uniqueness checks made
    /// through [`Transaction::insert_new`] therefore hold at commit time,
    /// with no window for a second writer in between.
    pub fn transact<T>(&self, op: impl FnOnce(&mut Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut records = self.records.lock().expect("record store mutex poisoned");
        let mut txn = Transaction {
            committed: &*records,
            staged: HashMap::new(),
        };
        let value = op(&mut txn)?;
        let staged = txn.staged;
        records.extend(staged);
        Ok(value)
    }
}

/// An in-progress atomic operation: a read view of the committed records
/// plus a buffer of staged writes.
pub struct Transaction<'a> {
    committed: &'a HashMap<RecordKey, Vec<u8>>,
    staged: HashMap<RecordKey, Vec<u8>>,
}

impl Transaction<'_> {
    /// Read the record at `key`. Staged writes take precedence, so a
    /// transaction always sees its own writes.
    pub fn get<T: DeserializeOwned>(&self, key: RecordKey) -> Result<Option<T>> {
        self.staged
            .get(&key)
            .or_else(|| self.committed.get(&key))
            .map(|bytes| serde_json::from_slice(bytes))
            .transpose()
            .map_err(Error::from)
    }

    /// Create the record at `key`, failing with [`Error::AlreadyExists`] if
    /// any record is already there. Check and write are a single step under
    /// the store lock; this is never an existence check followed by a
    /// separate insert.
    pub fn insert_new<T: Serialize>(&mut self, key: RecordKey, record: &T) -> Result<()> {
        if self.staged.contains_key(&key) || self.committed.contains_key(&key) {
            return Err(Error::AlreadyExists(key));
        }
        self.staged.insert(key, serde_json::to_vec(record)?);
        Ok(())
    }

    /// Overwrite the record at `key`. For updating records the transaction
    /// has already resolved.
    pub fn put<T: Serialize>(&mut self, key: RecordKey, record: &T) -> Result<()> {
        self.staged.insert(key, serde_json::to_vec(record)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::model::id::ElectionId;

    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Doc {
        value: u64,
    }

    fn key() -> RecordKey {
        RecordKey::election(ElectionId::random(rand::thread_rng()))
    }

    #[test]
    fn insert_new_then_get() {
        let store = RecordStore::new();
        let key = key();
        store
            .transact(|txn| txn.insert_new(key, &Doc { value: 7 }))
            .unwrap();
        let doc: Option<Doc> = store.transact(|txn| txn.get(key)).unwrap();
        assert_eq!(doc, Some(Doc { value: 7 }));
    }

    #[test]
    fn insert_new_rejects_existing_key() {
        let store = RecordStore::new();
        let key = key();
        store
            .transact(|txn| txn.insert_new(key, &Doc { value: 1 }))
            .unwrap();
        let err = store
            .transact(|txn| txn.insert_new(key, &Doc { value: 2 }))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(k) if k == key));

        // The original record is untouched.
        let doc: Option<Doc> = store.transact(|txn| txn.get(key)).unwrap();
        assert_eq!(doc, Some(Doc { value: 1 }));
    }

    #[test]
    fn insert_new_sees_writes_staged_earlier_in_the_transaction() {
        let store = RecordStore::new();
        let key = key();
        let err = store
            .transact(|txn| {
                txn.insert_new(key, &Doc { value: 1 })?;
                txn.insert_new(key, &Doc { value: 2 })
            })
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn failed_transaction_discards_staged_writes() {
        let store = RecordStore::new();
        let first = key();
        let second = key();
        let result: Result<()> = store.transact(|txn| {
            txn.insert_new(first, &Doc { value: 1 })?;
            Err(Error::NotFound("simulated mid-transaction failure".into()))
        });
        assert!(result.is_err());

        // Nothing committed, not even the write staged before the failure.
        let doc: Option<Doc> = store.transact(|txn| txn.get(first)).unwrap();
        assert_eq!(doc, None);
        let doc: Option<Doc> = store.transact(|txn| txn.get(second)).unwrap();
        assert_eq!(doc, None);
    }

    #[test]
    fn transaction_reads_its_own_writes() {
        let store = RecordStore::new();
        let key = key();
        store
            .transact(|txn| {
                txn.insert_new(key, &Doc { value: 3 })?;
                let doc: Option<Doc> = txn.get(key)?;
                assert_eq!(doc, Some(Doc { value: 3 }));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn put_overwrites() {
        let store = RecordStore::new();
        let key = key();
        store
            .transact(|txn| {
                txn.insert_new(key, &Doc { value: 1 })?;
                txn.put(key, &Doc { value: 2 })
            })
            .unwrap();
        let doc: Option<Doc> = store.transact(|txn| txn.get(key)).unwrap();
        assert_eq!(doc, Some(Doc { value: 2 }));
    }
}
