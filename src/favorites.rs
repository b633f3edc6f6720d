//! The favorites list: an ordered list of story ids and its resolved view.
//!
//! Ids are stored as a JSON array under their own key. Resolution walks the
//! ids in list order and keeps only those that still name a story, so ids left
//! behind by a deleted story are skipped rather than reported.

use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::{CatalogError, CatalogResult};
use crate::id::StoryId;
use crate::storage::{StorageArea, StorageError};
use crate::store::StoryStore;
use crate::story::Story;
use crate::sync::{SyncParticipant, SyncPolicy};

const WATCHER_CAPACITY: usize = 64;

/// Favorites resolver with a published snapshot for presentation layers.
pub struct Favorites {
    area: Arc<dyn StorageArea>,
    key: String,
    stories: Arc<StoryStore>,
    policy: SyncPolicy,
    published: RwLock<Vec<Story>>,
    watchers: Mutex<Vec<Sender<Vec<Story>>>>,
}

impl Favorites {
    #[must_use]
    pub fn new(area: Arc<dyn StorageArea>, key: impl Into<String>, stories: Arc<StoryStore>) -> Self {
        Self {
            area,
            key: key.into(),
            stories,
            policy: SyncPolicy::Live,
            published: RwLock::new(Vec::new()),
            watchers: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored ids in list order. Absent or unreadable data reads as empty.
    #[must_use]
    pub fn ids(&self) -> Vec<StoryId> {
        let Some(raw) = self.area.get_item(&self.key) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key = %self.key, error = %err, "favorites unreadable; treating as empty");
            Vec::new()
        })
    }

    #[must_use]
    pub fn contains(&self, id: &StoryId) -> bool {
        self.ids().contains(id)
    }

    /// Stories named by the stored ids, in list order, skipping dangling ids.
    pub fn resolve(&self) -> CatalogResult<Vec<Story>> {
        let ids = self.ids();
        self.stories.with_items(|stories| {
            ids.iter()
                .filter_map(|id| stories.iter().find(|s| &s.id == id).cloned())
                .collect()
        })
    }

    /// Resolve again and publish the result to [`published`](Self::published)
    /// and every subscriber.
    pub fn refresh(&self) -> CatalogResult<Vec<Story>> {
        let resolved = self.resolve()?;
        match self.published.write() {
            Ok(mut published) => published.clone_from(&resolved),
            Err(_) => {
                return Err(CatalogError::Persistence(StorageError::Backend(
                    "poisoned lock: favorites.published".to_string(),
                )))
            }
        }
        self.notify(&resolved);
        Ok(resolved)
    }

    /// Last published snapshot. Empty until the first refresh.
    #[must_use]
    pub fn published(&self) -> Vec<Story> {
        self.published.read().map(|p| p.clone()).unwrap_or_default()
    }

    /// Receive every snapshot published from now on.
    ///
    /// A subscriber that falls more than a few snapshots behind misses the
    /// overflow; the latest state is always available from `published`.
    pub fn subscribe(&self) -> Receiver<Vec<Story>> {
        let (tx, rx) = bounded(WATCHER_CAPACITY);
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.push(tx);
        }
        rx
    }

    /// Append `id` unless already present. Returns whether it was added.
    ///
    /// The id is not checked against the story store.
    pub fn add(&self, id: &StoryId) -> CatalogResult<bool> {
        let mut ids = self.ids();
        if ids.contains(id) {
            return Ok(false);
        }
        ids.push(id.clone());
        self.store(&ids)?;
        Ok(true)
    }

    /// Remove `id`. Returns whether it was present.
    pub fn remove(&self, id: &StoryId) -> CatalogResult<bool> {
        let mut ids = self.ids();
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() == before {
            return Ok(false);
        }
        self.store(&ids)?;
        Ok(true)
    }

    /// Flip membership of `id`. Returns whether it is a favorite afterwards.
    pub fn toggle(&self, id: &StoryId) -> CatalogResult<bool> {
        if self.contains(id) {
            self.remove(id).map(|_| false)
        } else {
            self.add(id).map(|_| true)
        }
    }

    fn store(&self, ids: &[StoryId]) -> CatalogResult<()> {
        let raw = serde_json::to_string(ids).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.area.set_item(&self.key, &raw)?;
        self.refresh()?;
        Ok(())
    }

    fn notify(&self, snapshot: &[Story]) {
        let Ok(mut watchers) = self.watchers.lock() else {
            return;
        };
        watchers.retain(|tx| match tx.try_send(snapshot.to_vec()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(key = %self.key, "favorites watcher lagging; snapshot dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

impl SyncParticipant for Favorites {
    fn name(&self) -> &str {
        "favorites"
    }

    fn watched_keys(&self) -> Vec<String> {
        vec![self.key.clone()]
    }

    fn policy(&self) -> SyncPolicy {
        self.policy
    }

    fn on_external_change(&self, _key: &str) -> CatalogResult<()> {
        self.refresh().map(|_| ())
    }
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites")
            .field("key", &self.key)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdAllocator;
    use crate::storage::InMemoryStorageArea;
    use crate::store::EntityStore;
    use crate::story::StoryDraft;

    fn setup(area: &Arc<dyn StorageArea>) -> (Arc<StoryStore>, Favorites) {
        let stories = Arc::new(
            EntityStore::new(Arc::clone(area), "stories", Arc::new(IdAllocator::new())).seed_defaults(false),
        );
        let favorites = Favorites::new(Arc::clone(area), "favorites", Arc::clone(&stories));
        (stories, favorites)
    }

    #[test]
    fn dangling_ids_are_skipped_in_list_order() {
        let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::new());
        let (stories, favorites) = setup(&area);
        let a = stories.add(StoryDraft::new("A", "c")).unwrap();
        let b = stories.add(StoryDraft::new("B", "c")).unwrap();

        area.set_item("favorites", &format!(r#"["{}","gone","{}"]"#, b.id, a.id))
            .unwrap();

        let resolved = favorites.resolve().unwrap();
        assert_eq!(resolved, vec![b, a]);
        assert_eq!(favorites.ids().len(), 3);
    }

    #[test]
    fn unreadable_favorites_resolve_to_empty() {
        let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::new());
        let (_, favorites) = setup(&area);
        area.set_item("favorites", "not-json").unwrap();

        assert!(favorites.ids().is_empty());
        assert!(favorites.resolve().unwrap().is_empty());
    }

    #[test]
    fn add_remove_toggle() {
        let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::new());
        let (stories, favorites) = setup(&area);
        let s = stories.add(StoryDraft::new("A", "c")).unwrap();

        assert!(favorites.add(&s.id).unwrap());
        assert!(!favorites.add(&s.id).unwrap());
        assert_eq!(favorites.ids(), vec![s.id.clone()]);

        assert!(!favorites.toggle(&s.id).unwrap());
        assert!(!favorites.contains(&s.id));
        assert!(favorites.toggle(&s.id).unwrap());
        assert!(favorites.remove(&s.id).unwrap());
        assert!(!favorites.remove(&s.id).unwrap());
    }

    #[test]
    fn local_writes_publish_to_subscribers() {
        let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::new());
        let (stories, favorites) = setup(&area);
        let s = stories.add(StoryDraft::new("A", "c")).unwrap();
        let rx = favorites.subscribe();

        favorites.add(&s.id).unwrap();
        assert_eq!(rx.try_recv().unwrap(), vec![s.clone()]);
        assert_eq!(favorites.published(), vec![s]);
    }

    #[test]
    fn rejected_write_keeps_previous_list() {
        let area: Arc<dyn StorageArea> = Arc::new(InMemoryStorageArea::with_quota(24));
        let (_, favorites) = setup(&area);

        favorites.add(&StoryId::new("1")).unwrap();
        let err = favorites.add(&StoryId::new("a-rather-long-story-id")).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(favorites.ids(), vec![StoryId::new("1")]);
    }
}
