//! # Firefly - catalog data layer for a children's story site
//!
//! Firefly keeps stories, categories, uploaded media metadata and a favorites
//! list in a flat string-keyed storage area, the way a browser front end keeps
//! them in local storage. Every collection is mirrored in full under its own
//! key and read back lazily.
//!
//! ## Core Concepts
//!
//! - **StorageArea**: the persistence port; in-memory, shared between browsing
//!   contexts, or file-backed with the `persistent` feature
//! - **EntityStore**: a typed collection with list/get/add/update/delete
//! - **DeleteGuard**: referential integrity checked before a delete
//! - **MediaRegistry**: per-kind media metadata plus a session-only payload cache
//! - **SyncListener**: applies other contexts' writes to stores declared live
//!
//! ## Usage
//!
//! ```rust,ignore
//! use firefly::{Catalog, CategoryDraft, StoryDraft};
//!
//! let catalog = Catalog::in_memory();
//!
//! let music = catalog.categories().add(CategoryDraft::new("Music"))?;
//! let story = catalog
//!     .stories()
//!     .add(StoryDraft::new("Moonlight Lullaby", music.id.clone()).duration(6))?;
//!
//! catalog.favorites().add(&story.id)?;
//!
//! // A category that a story still names cannot be deleted.
//! assert!(catalog.categories().delete(&music.id).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Entities
pub mod category;
pub mod error;
pub mod id;
pub mod media;
pub mod seed;
pub mod story;

// Storage and stores
pub mod storage;
pub mod store;
pub mod sync;

// Catalog surface
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod session;
pub mod stats;

pub use catalog::Catalog;
pub use category::{Category, CategoryDraft, CategoryPatch};
pub use config::{CatalogConfig, StorageKeys, SyncConfig};
pub use error::{CatalogError, CatalogResult, ValidationError};
pub use favorites::Favorites;
pub use id::{CategoryId, IdAllocator, MediaId, StoryId};
pub use media::{HandleCache, MediaAssetRecord, MediaDraft, MediaKind, MediaPatch, MediaRegistry, TransientHandle};
pub use session::AdminSession;
pub use stats::{story_counts_by_category, CatalogStats};
pub use story::{Story, StoryDraft, StoryPatch};

pub use storage::{
    BrowsingContext, InMemoryStorageArea, SharedStorage, StorageArea, StorageError, StorageEvent,
    StorageEventStream,
};
pub use store::{CategoryStore, DeleteGuard, Entity, EntityStore, IntegrityCheck, StoryStore};
pub use sync::{SyncListener, SyncParticipant, SyncPolicy};
