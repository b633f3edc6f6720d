//! The persistence port.
//!
//! A storage area is a flat, string-keyed, string-valued map scoped to one
//! origin, shaped after the DOM `Storage` interface. It knows nothing about
//! relations, transactions or types; the entity stores build those on top.

use thiserror::Error;

/// Errors that can occur while reading or writing a storage area.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The write would push the area past its byte quota.
    #[error("Quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the area would hold after the write.
        needed: usize,
        /// Configured quota.
        quota: usize,
    },

    /// A value could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend error (I/O, poisoned lock, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Object-safe key/value storage area.
///
/// All operations are synchronous and complete before returning.
pub trait StorageArea: Send + Sync {
    /// Retrieves the value stored under `key`, or `None` if absent.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Sets the value for `key`, overwriting any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the item stored under `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Returns all keys currently present, in ascending order.
    fn keys(&self) -> Vec<String>;

    /// Returns the number of items in the area.
    fn len(&self) -> usize {
        self.keys().len()
    }

    /// Returns true if the area holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
