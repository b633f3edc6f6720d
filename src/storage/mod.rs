//! Storage layer: the persistence port and its backends.
//!
//! - [`StorageArea`] is the flat string-keyed port every store writes through.
//! - [`InMemoryStorageArea`] is the default backend and the test fake.
//! - [`SharedStorage`] / [`BrowsingContext`] model several tabs on one origin
//!   and deliver [`StorageEvent`]s between them.
//! - `persistent` (feature) provides a file-backed area.

mod event;
mod memory;
mod shared;
mod traits;

#[cfg(feature = "persistent")]
pub mod persistent;

pub use event::{ContextId, StorageEvent, StorageEventStream, SubscriptionId};
pub use memory::InMemoryStorageArea;
pub use shared::{BrowsingContext, SharedStorage, DEFAULT_EVENT_CAPACITY};
pub use traits::{StorageArea, StorageError};

#[cfg(feature = "persistent")]
pub use persistent::{open_storage, FileStorageArea, FileStorageConfig};
