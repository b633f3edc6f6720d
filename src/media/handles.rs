use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::id::MediaId;

use super::TransientHandle;

#[derive(Debug)]
struct Entry {
    handle: TransientHandle,
    payload: Arc<[u8]>,
}

/// Session-scoped payload cache keyed by asset id.
///
/// Nothing here is persisted. A fresh process starts with an empty cache, so
/// handles stored in metadata from an earlier session resolve to `None`.
/// Entries live until [`revoke`](Self::revoke) or process exit; deleting the
/// metadata record does not release them.
#[derive(Debug, Default)]
pub struct HandleCache {
    entries: RwLock<HashMap<MediaId, Entry>>,
}

impl HandleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, id: MediaId, handle: TransientHandle, payload: Arc<[u8]>) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(id, Entry { handle, payload });
            }
            Err(_) => tracing::warn!(%id, "handle cache poisoned; payload not cached"),
        }
    }

    /// Payload for `id`, if minted in this session and not revoked.
    #[must_use]
    pub fn payload(&self, id: &MediaId) -> Option<Arc<[u8]>> {
        let entries = self.entries.read().ok()?;
        entries.get(id).map(|e| Arc::clone(&e.payload))
    }

    /// Payload behind `handle`, if it was minted in this session.
    #[must_use]
    pub fn resolve(&self, handle: &TransientHandle) -> Option<Arc<[u8]>> {
        let entries = self.entries.read().ok()?;
        entries
            .values()
            .find(|e| &e.handle == handle)
            .map(|e| Arc::clone(&e.payload))
    }

    /// Release the payload for `id`. Returns whether anything was held.
    pub fn revoke(&self, id: &MediaId) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Number of payloads held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
