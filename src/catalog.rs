//! The catalog: every store wired over one storage area.

use std::sync::Arc;

use crate::category::Category;
use crate::config::CatalogConfig;
use crate::error::CatalogResult;
use crate::favorites::Favorites;
use crate::id::IdAllocator;
use crate::media::MediaRegistry;
use crate::session::AdminSession;
use crate::stats::{story_counts_by_category, CatalogStats};
use crate::storage::{InMemoryStorageArea, SharedStorage, StorageArea, StorageEventStream};
use crate::store::{CategoryStore, EntityStore, StoryReferences, StoryStore};
use crate::sync::{SyncListener, SyncParticipant};

/// Stories, categories, media, favorites and the admin session for one
/// browsing context.
///
/// Categories are guarded by the story store: deleting a category that any
/// story still names fails with `ValidationConflict`. Creating or updating a
/// story does not check its category.
pub struct Catalog {
    config: CatalogConfig,
    area: Arc<dyn StorageArea>,
    stories: Arc<StoryStore>,
    categories: Arc<CategoryStore>,
    media: Arc<MediaRegistry>,
    favorites: Arc<Favorites>,
    session: AdminSession,
}

impl Catalog {
    /// Build a catalog over `area`.
    ///
    /// # Errors
    /// `Validation` if `config` is invalid.
    pub fn new(area: Arc<dyn StorageArea>, config: CatalogConfig) -> CatalogResult<Self> {
        let config = config.validate()?;
        Ok(Self::build(area, config))
    }

    /// Catalog over a fresh, unbounded in-memory area with the default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::build(Arc::new(InMemoryStorageArea::new()), CatalogConfig::default())
    }

    /// Open a catalog in a new browsing context of `shared`, together with
    /// the listener that keeps its live stores current.
    ///
    /// The listener's queue holds `config.event_capacity` events; anything
    /// beyond that between two polls is dropped.
    ///
    /// # Errors
    /// `Validation` if `config` is invalid.
    pub fn attach(shared: &SharedStorage, config: CatalogConfig) -> CatalogResult<(Self, SyncListener)> {
        let config = config.validate()?;
        let context = shared.context();
        let events = context.subscribe_with_capacity(config.event_capacity);
        let catalog = Self::build(Arc::new(context), config);
        let listener = catalog.sync_listener(events);
        Ok((catalog, listener))
    }

    fn build(area: Arc<dyn StorageArea>, config: CatalogConfig) -> Self {
        let ids = Arc::new(IdAllocator::new());
        let keys = &config.keys;

        let stories = Arc::new(
            EntityStore::new(Arc::clone(&area), keys.stories.clone(), Arc::clone(&ids))
                .seed_defaults(config.seed_defaults)
                .sync_policy(config.sync.stories),
        );
        let categories = Arc::new(
            EntityStore::new(Arc::clone(&area), keys.categories.clone(), Arc::clone(&ids))
                .seed_defaults(config.seed_defaults)
                .sync_policy(config.sync.categories)
                .with_guard(Arc::new(StoryReferences::new(Arc::clone(&stories)))),
        );
        let media = Arc::new(MediaRegistry::new(&area, &ids, &keys.media_prefix, config.sync.media));
        let favorites = Arc::new(
            Favorites::new(Arc::clone(&area), keys.favorites.clone(), Arc::clone(&stories))
                .sync_policy(config.sync.favorites),
        );
        let session = AdminSession::new(Arc::clone(&area), keys.admin_password.clone());

        Self {
            config,
            area,
            stories,
            categories,
            media,
            favorites,
            session,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The storage area every store writes through.
    #[must_use]
    pub fn area(&self) -> &Arc<dyn StorageArea> {
        &self.area
    }

    #[must_use]
    pub fn stories(&self) -> &StoryStore {
        &self.stories
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    #[must_use]
    pub fn media(&self) -> &MediaRegistry {
        &self.media
    }

    #[must_use]
    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    #[must_use]
    pub const fn session(&self) -> &AdminSession {
        &self.session
    }

    /// A listener over `events` with every store registered. Only the stores
    /// configured as live are kept by it.
    #[must_use]
    pub fn sync_listener(&self, events: StorageEventStream) -> SyncListener {
        let mut listener = SyncListener::new(events);
        let participants: [Arc<dyn SyncParticipant>; 4] = [
            Arc::clone(&self.stories) as Arc<dyn SyncParticipant>,
            Arc::clone(&self.categories) as Arc<dyn SyncParticipant>,
            Arc::clone(&self.media) as Arc<dyn SyncParticipant>,
            Arc::clone(&self.favorites) as Arc<dyn SyncParticipant>,
        ];
        for participant in participants {
            listener.register(participant);
        }
        listener
    }

    /// Dashboard totals.
    pub fn stats(&self) -> CatalogResult<CatalogStats> {
        let stories = self.stories.list()?;
        let categories = self.categories.list()?;
        Ok(CatalogStats::compute(&stories, &categories))
    }

    /// Story count per category, in category order.
    pub fn category_summary(&self) -> CatalogResult<Vec<(Category, usize)>> {
        let stories = self.stories.list()?;
        let categories = self.categories.list()?;
        Ok(story_counts_by_category(&stories, &categories))
    }

    /// Re-read every store from the area and republish favorites.
    pub fn reload_all(&self) -> CatalogResult<()> {
        self.stories.reload()?;
        self.categories.reload()?;
        self.media.reload()?;
        self.favorites.refresh()?;
        tracing::debug!("catalog reloaded");
        Ok(())
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .field("stories", &self.stories)
            .field("categories", &self.categories)
            .field("media", &self.media)
            .field("favorites", &self.favorites)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "persistent")]
impl Catalog {
    /// Open a catalog backed by a snapshot file in `dir`.
    ///
    /// # Errors
    /// `Persistence` if the directory cannot be locked or read, `Validation`
    /// if `config` is invalid.
    pub fn open(
        dir: &std::path::Path,
        storage: crate::storage::FileStorageConfig,
        config: CatalogConfig,
    ) -> CatalogResult<Self> {
        let area = crate::storage::open_storage(dir, Some(storage))?;
        Self::new(Arc::new(area), config)
    }
}
