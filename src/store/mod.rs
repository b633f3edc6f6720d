//! Entity stores: typed collections over the storage area.

mod engine;
mod entity;
mod integrity;

pub use engine::EntityStore;
pub use entity::Entity;
pub use integrity::{check_category_references, DeleteGuard, IntegrityCheck, StoryReferences};

use crate::category::Category;
use crate::story::Story;

/// Store of [`Story`] records.
pub type StoryStore = EntityStore<Story>;

/// Store of [`Category`] records.
pub type CategoryStore = EntityStore<Category>;
