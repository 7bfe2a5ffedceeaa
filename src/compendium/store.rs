//! Storage-backed compendium lookup service.
//!
//! Invoked only from effects; every call is a plain fallible store
//! operation.

use std::sync::Arc;

use crate::storage::{KeyValueStore, KeyValueStoreExt, StorageError};

use super::entry::{CompendiumEntry, CompendiumItemType};

#[derive(Clone)]
pub struct Compendium {
    store: Arc<dyn KeyValueStore>,
}

impl Compendium {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, key: &str) -> Result<Option<CompendiumEntry>, StorageError> {
        self.store.get(key)
    }

    pub fn put(&self, entry: &CompendiumEntry) -> Result<(), StorageError> {
        self.store.put(entry)
    }

    /// All entries of `item_type`, or everything when `None`.
    pub fn list(
        &self,
        item_type: Option<CompendiumItemType>,
    ) -> Result<Vec<CompendiumEntry>, StorageError> {
        let prefix = match item_type {
            Some(t) => t.key_prefix(),
            None => CompendiumItemType::any_prefix(),
        };
        self.store
            .fetch_all_raw(prefix)?
            .into_iter()
            .map(|record| {
                serde_json::from_value(record.value).map_err(|err| StorageError::Decode {
                    key: record.key,
                    message: err.to_string(),
                })
            })
            .collect()
    }
}
