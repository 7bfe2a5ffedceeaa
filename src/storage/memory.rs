//! In-memory key-value store.
//!
//! Backs tests and the default environment. An ordered map makes
//! prefix scans natural.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{KeyValueStore, Record, StorageError};

#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<String, Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<Record>, StorageError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn put_raw(&self, record: Record) -> Result<(), StorageError> {
        self.records.write().insert(record.key.clone(), record);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.records.write().remove(key).is_some())
    }

    fn remove_all(&self, key_prefix: &str) -> Result<usize, StorageError> {
        let mut records = self.records.write();
        let stale: Vec<String> = records
            .range(key_prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(key_prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            records.remove(key);
        }
        Ok(stale.len())
    }

    fn fetch_all_raw(&self, key_prefix: &str) -> Result<Vec<Record>, StorageError> {
        let records = self.records.read();
        Ok(records
            .range(key_prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(key_prefix))
            .map(|(_, record)| record.clone())
            .collect())
    }
}
