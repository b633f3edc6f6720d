//! File-backed storage area.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{StorageArea, StorageError};

use super::codec::{decode_snapshot, encode_snapshot};
use super::lock::DirLock;
use super::FileStorageConfig;

const SNAPSHOT_FILE: &str = "storage.kv";

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

fn io_err(context: &str, err: &std::io::Error) -> StorageError {
    StorageError::Backend(format!("{context}: {err}"))
}

fn usage(items: &BTreeMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// A storage area persisted as a single checksummed snapshot file.
///
/// Every mutation rewrites the snapshot (temp file, then rename), so the file
/// always holds a complete key space. The in-memory copy only changes after
/// the file write succeeds.
#[derive(Debug)]
pub struct FileStorageArea {
    path: PathBuf,
    config: FileStorageConfig,
    items: RwLock<BTreeMap<String, String>>,
    _lock: DirLock,
}

impl FileStorageArea {
    /// Open or create the area stored in `dir`.
    ///
    /// A snapshot that fails to decode is treated as absent: the area opens
    /// empty and the next write replaces the file.
    ///
    /// # Errors
    /// - If the directory cannot be created
    /// - If another process holds the directory lock
    /// - If the snapshot exists but cannot be read
    pub fn open(dir: &Path, config: FileStorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|e| io_err("failed to create storage directory", &e))?;
        let lock = DirLock::acquire(dir).map_err(|e| io_err("failed to acquire lock", &e))?;

        let path = dir.join(SNAPSHOT_FILE);
        let items = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| io_err("failed to read snapshot", &e))?;
            match decode_snapshot(&bytes) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding unreadable storage snapshot");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), items = items.len(), "opened file storage area");
        Ok(Self {
            path,
            config,
            items: RwLock::new(items),
            _lock: lock,
        })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_snapshot(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let bytes = encode_snapshot(items)?;
        let temp = self.path.with_extension("kv.tmp");

        let result = self.replace_with(&temp, &bytes);
        if result.is_err() {
            if let Err(err) = fs::remove_file(&temp) {
                tracing::debug!(path = %temp.display(), error = %err, "temp snapshot not removed");
            }
        }
        result
    }

    fn replace_with(&self, temp: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let mut file = File::create(temp).map_err(|e| io_err("failed to create temp snapshot", &e))?;
        file.write_all(bytes)
            .map_err(|e| io_err("failed to write temp snapshot", &e))?;
        if self.config.sync_on_write {
            file.sync_all()
                .map_err(|e| io_err("failed to sync temp snapshot", &e))?;
        }
        drop(file);

        fs::rename(temp, &self.path).map_err(|e| io_err("failed to replace snapshot", &e))
    }

    fn commit(
        &self,
        key: &str,
        mutate: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| lock_err("file_area.commit"))?;
        let mut next = items.clone();
        mutate(&mut next);

        if let Some(quota) = self.config.max_bytes {
            let needed = usage(&next);
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        self.write_snapshot(&next)?;
        *items = next;
        Ok(())
    }
}

impl StorageArea for FileStorageArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.commit(key, |items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let present = self
            .items
            .read()
            .map_err(|_| lock_err("file_area.remove_item"))?
            .contains_key(key);
        if !present {
            return Ok(());
        }
        self.commit(key, |items| {
            items.remove(key);
        })
    }

    fn keys(&self) -> Vec<String> {
        self.items
            .read()
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let area = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
            area.set_item("favorites", "[\"a\"]").unwrap();
            area.set_item("gone", "1").unwrap();
            area.remove_item("gone").unwrap();
        }

        let area = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
        assert_eq!(area.get_item("favorites").as_deref(), Some("[\"a\"]"));
        assert!(area.get_item("gone").is_none());
        assert_eq!(area.len(), 1);
    }

    #[test]
    fn corrupt_snapshot_opens_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SNAPSHOT_FILE), b"not a snapshot at all").unwrap();

        let area = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
        assert!(area.is_empty());

        area.set_item("k", "v").unwrap();
        drop(area);
        let area = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
        assert_eq!(area.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn quota_failure_leaves_file_and_memory_unchanged() {
        let dir = tempdir().unwrap();
        let config = FileStorageConfig {
            max_bytes: Some(8),
            ..FileStorageConfig::default()
        };
        let area = FileStorageArea::open(dir.path(), config).unwrap();
        area.set_item("k", "v").unwrap();

        let err = area.set_item("k", "much too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(area.get_item("k").as_deref(), Some("v"));

        drop(area);
        let area = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
        assert_eq!(area.get_item("k").as_deref(), Some("v"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_replace_removes_temp_file() {
        let dir = tempdir().unwrap();
        let area = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
        area.set_item("k", "v").unwrap();

        // a non-empty directory in place of the snapshot makes the rename fail
        let snapshot = dir.path().join(SNAPSHOT_FILE);
        fs::remove_file(&snapshot).unwrap();
        fs::create_dir(&snapshot).unwrap();
        fs::write(snapshot.join("occupied"), b"x").unwrap();

        assert!(area.set_item("k", "w").is_err());
        assert_eq!(area.get_item("k").as_deref(), Some("v"));
        assert!(!dir.path().join("storage.kv.tmp").exists());
    }

    #[test]
    fn second_open_in_same_directory_is_refused() {
        let dir = tempdir().unwrap();
        let _first = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap();
        let err = FileStorageArea::open(dir.path(), FileStorageConfig::default()).unwrap_err();
        assert!(err.to_string().contains("lock"));
    }
}
