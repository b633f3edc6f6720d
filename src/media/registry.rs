use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult};
use crate::id::{IdAllocator, MediaId};
use crate::storage::StorageArea;
use crate::store::{Entity, EntityStore};
use crate::sync::SyncPolicy;

use super::handles::HandleCache;
use super::{MediaAssetRecord, MediaDraft, MediaKind, TransientHandle};

/// Per-kind metadata lists plus the session payload cache.
#[derive(Debug)]
pub struct MediaRegistry {
    image: EntityStore<MediaAssetRecord>,
    video: EntityStore<MediaAssetRecord>,
    audio: EntityStore<MediaAssetRecord>,
    handles: HandleCache,
}

impl MediaRegistry {
    /// Create a registry persisting each kind under `<key_prefix><kind>`.
    #[must_use]
    pub fn new(
        area: &Arc<dyn StorageArea>,
        ids: &Arc<IdAllocator>,
        key_prefix: &str,
        policy: SyncPolicy,
    ) -> Self {
        let partition = |kind: MediaKind| {
            EntityStore::new(Arc::clone(area), format!("{key_prefix}{kind}"), Arc::clone(ids))
                .seed_defaults(false)
                .sync_policy(policy)
        };
        Self {
            image: partition(MediaKind::Image),
            video: partition(MediaKind::Video),
            audio: partition(MediaKind::Audio),
            handles: HandleCache::new(),
        }
    }

    /// The metadata store for one kind.
    #[must_use]
    pub const fn partition(&self, kind: MediaKind) -> &EntityStore<MediaAssetRecord> {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        }
    }

    /// Register an upload: persist its metadata and hold the payload for this session.
    ///
    /// # Errors
    /// `Persistence` if the metadata write is rejected; the payload is then not cached.
    pub fn upload(
        &self,
        kind: MediaKind,
        name: impl Into<String>,
        payload: impl Into<Arc<[u8]>>,
    ) -> CatalogResult<MediaAssetRecord> {
        let payload = payload.into();
        let handle = TransientHandle::mint();
        let record = self.partition(kind).add(MediaDraft {
            name: name.into(),
            kind,
            handle: handle.clone(),
            size: payload.len() as u64,
        })?;
        self.handles.insert(record.id.clone(), handle, payload);
        tracing::debug!(%kind, id = %record.id, size = record.size, "media uploaded");
        Ok(record)
    }

    /// Metadata for one kind, in upload order.
    pub fn list_by_kind(&self, kind: MediaKind) -> CatalogResult<Vec<MediaAssetRecord>> {
        self.partition(kind).list()
    }

    pub fn get(&self, kind: MediaKind, id: &MediaId) -> CatalogResult<Option<MediaAssetRecord>> {
        self.partition(kind).get(id)
    }

    /// Remove the metadata record and return it.
    ///
    /// The cached payload is left in place; call [`revoke`](Self::revoke) to release it.
    ///
    /// # Errors
    /// `NotFound` if no record of that kind has `id`.
    pub fn delete(&self, kind: MediaKind, id: &MediaId) -> CatalogResult<MediaAssetRecord> {
        let partition = self.partition(kind);
        let record = partition
            .get(id)?
            .ok_or_else(|| CatalogError::not_found(MediaAssetRecord::KIND, id.to_string()))?;
        if !partition.delete(id)? {
            return Err(CatalogError::not_found(MediaAssetRecord::KIND, id.to_string()));
        }
        Ok(record)
    }

    /// Payload uploaded in this session, if still held.
    #[must_use]
    pub fn payload(&self, id: &MediaId) -> Option<Arc<[u8]>> {
        self.handles.payload(id)
    }

    /// Release a cached payload. Returns whether one was held.
    pub fn revoke(&self, id: &MediaId) -> bool {
        self.handles.revoke(id)
    }

    #[must_use]
    pub const fn handles(&self) -> &HandleCache {
        &self.handles
    }

    /// Re-read every partition from storage.
    pub fn reload(&self) -> CatalogResult<()> {
        for kind in MediaKind::ALL {
            self.partition(kind).reload()?;
        }
        Ok(())
    }
}
