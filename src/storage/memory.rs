//! In-memory storage area.
//!
//! Thread-safe map used for tests, embedded use, and as the origin-wide
//! backing of [`SharedStorage`](super::SharedStorage). An optional byte quota
//! reproduces the browser's quota-exceeded failure.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::traits::{StorageArea, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

#[derive(Debug, Default)]
struct AreaState {
    items: BTreeMap<String, String>,
    bytes: usize,
}

/// Thread-safe in-memory storage area.
#[derive(Debug, Default)]
pub struct InMemoryStorageArea {
    state: RwLock<AreaState>,
    quota: Option<usize>,
}

impl InMemoryStorageArea {
    /// Create a new empty area without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty area that rejects writes beyond `quota` bytes.
    ///
    /// Usage is measured as the sum of key and value lengths.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            state: RwLock::default(),
            quota: Some(quota),
        }
    }

    /// Bytes currently in use.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.state.read().map(|s| s.bytes).unwrap_or(0)
    }
}

impl StorageArea for InMemoryStorageArea {
    fn get_item(&self, key: &str) -> Option<String> {
        let state = self.state.read().ok()?;
        state.items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("area.set_item"))?;
        let previous = state.items.get(key).map_or(0, |old| entry_size(key, old));
        let needed = state.bytes - previous + entry_size(key, value);

        if let Some(quota) = self.quota {
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        state.items.insert(key.to_string(), value.to_string());
        state.bytes = needed;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("area.remove_item"))?;
        if let Some(old) = state.items.remove(key) {
            state.bytes -= entry_size(key, &old);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.state
            .read()
            .map(|s| s.items.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.state.read().map(|s| s.items.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_area_basic_contract() {
        let area = InMemoryStorageArea::new();

        // starts empty
        assert_eq!(area.len(), 0);
        assert!(area.is_empty());
        assert!(area.get_item("missing").is_none());

        // set + get
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("1"));
        assert_eq!(area.get_item("b").as_deref(), Some("2"));

        // overwrite keeps len()
        area.set_item("a", "ONE").unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("ONE"));

        // remove, including an absent key
        area.remove_item("b").unwrap();
        area.remove_item("never-set").unwrap();
        assert_eq!(area.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn quota_rejects_write_and_keeps_previous_value() {
        let area = InMemoryStorageArea::with_quota(16);
        area.set_item("k", "small").unwrap();
        assert_eq!(area.used_bytes(), 6);

        let err = area.set_item("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 16, .. }));
        assert_eq!(area.get_item("k").as_deref(), Some("small"));
        assert_eq!(area.used_bytes(), 6);
    }

    #[test]
    fn quota_accounts_for_overwrites_and_removals() {
        let area = InMemoryStorageArea::with_quota(10);
        area.set_item("a", "12345").unwrap(); // 6 bytes
        area.set_item("a", "123456789").unwrap(); // replaces, 10 bytes
        assert_eq!(area.used_bytes(), 10);

        assert!(area.set_item("b", "x").is_err());
        area.remove_item("a").unwrap();
        assert_eq!(area.used_bytes(), 0);
        area.set_item("b", "x").unwrap();
    }
}
