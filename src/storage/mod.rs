//! Key-value storage collaborator.
//!
//! The runtime treats persistence as an opaque key-value store plus
//! domain services layered on top. Records are JSON documents under
//! hierarchical string keys, so related records share a key prefix and
//! can be scanned or removed together. Every operation is fallible
//! with a [`StorageError`]; per-operation atomicity is the store's
//! concern, cross-operation transactions are nobody's.

mod memory;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryStore;

/// Errors produced by the storage layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// Value could not be encoded for storage
    #[error("failed to encode record '{key}': {message}")]
    Encode { key: String, message: String },

    /// Stored record could not be decoded into the requested type
    #[error("failed to decode record '{key}': {message}")]
    Decode { key: String, message: String },

    /// Backend refused or lost the operation
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Raw stored record: a key plus its JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: serde_json::Value,
}

/// Entity that derives its own storage key.
pub trait Keyed {
    fn key(&self) -> String;
}

/// Opaque key-value store consumed by domain services and effects.
pub trait KeyValueStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<Record>, StorageError>;

    fn put_raw(&self, record: Record) -> Result<(), StorageError>;

    /// Remove a record, reporting whether it existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// Remove every record under `key_prefix`, returning the count.
    fn remove_all(&self, key_prefix: &str) -> Result<usize, StorageError>;

    /// All records under `key_prefix`, in key order.
    fn fetch_all_raw(&self, key_prefix: &str) -> Result<Vec<Record>, StorageError>;
}

/// Typed accessors over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(record) = self.get_raw(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_value(record.value).map_err(|err| StorageError::Decode {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        Ok(Some(value))
    }

    fn put<T: Keyed + Serialize>(&self, value: &T) -> Result<(), StorageError> {
        let key = value.key();
        let value = serde_json::to_value(value).map_err(|err| StorageError::Encode {
            key: key.clone(),
            message: err.to_string(),
        })?;
        self.put_raw(Record { key, value })
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
