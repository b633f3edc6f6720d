//! File-backed storage area.
//!
//! Runs the data layer outside a browser by persisting the key space to disk:
//! - Whole-snapshot writes through temp file + rename
//! - CRC32 checksum for corruption detection (fails closed to empty)
//! - Exclusive directory lock for single-process access
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       FileStorageArea        │
//! │  in-memory BTreeMap (reads)  │
//! └──────────────┬───────────────┘
//!                ↓ every mutation
//! ┌──────────────────────────────┐
//! │  storage.kv (FFLY snapshot)  │
//! │  .firefly.lock (flock)       │
//! └──────────────────────────────┘
//! ```

mod area;
mod codec;
mod lock;

pub use area::FileStorageArea;
pub use lock::DirLock;

use std::path::Path;

use crate::storage::StorageError;

/// Configuration for the file-backed storage area.
#[derive(Debug, Clone)]
pub struct FileStorageConfig {
    /// Whether to fsync after every write (slower but safer).
    pub sync_on_write: bool,
    /// Byte quota over keys and values; `None` means unlimited.
    pub max_bytes: Option<usize>,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            sync_on_write: true,
            max_bytes: Some(5 * 1024 * 1024), // 5 MiB, the usual browser quota
        }
    }
}

/// Open or create a file-backed storage area in `dir`.
///
/// # Example
/// ```rust,ignore
/// use std::sync::Arc;
/// use firefly::storage::persistent::open_storage;
/// use firefly::{Catalog, CatalogConfig};
///
/// let area = open_storage("./catalog-data", None)?;
/// let catalog = Catalog::new(Arc::new(area), CatalogConfig::default())?;
/// ```
pub fn open_storage(
    dir: impl AsRef<Path>,
    config: Option<FileStorageConfig>,
) -> Result<FileStorageArea, StorageError> {
    FileStorageArea::open(dir.as_ref(), config.unwrap_or_default())
}
