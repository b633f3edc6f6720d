//! Referential integrity for deletes.
//!
//! Stories point at categories, and nothing validates that pointer when a
//! story is created or edited. The only enforced direction is the reverse: a
//! category cannot be deleted while a story still names it.

use std::sync::Arc;

use crate::category::Category;
use crate::error::CatalogResult;
use crate::id::CategoryId;
use crate::story::Story;

use super::engine::EntityStore;
use super::entity::Entity;

/// Verdict of a delete guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// Nothing references the candidate.
    Clear,
    /// `references` records still point at the candidate.
    Blocked { references: usize },
}

impl IntegrityCheck {
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Rule evaluated by [`EntityStore::delete`] before removing a record.
pub trait DeleteGuard<E: Entity>: Send + Sync {
    /// Kind of the referencing records, for error messages.
    fn referenced_by(&self) -> &'static str;

    /// Decide whether `id` may be deleted.
    fn check(&self, id: &E::Id) -> CatalogResult<IntegrityCheck>;
}

/// Pure rule: is `category_id` named by any story?
#[must_use]
pub fn check_category_references(category_id: &CategoryId, stories: &[Story]) -> IntegrityCheck {
    match stories.iter().filter(|s| &s.category_id == category_id).count() {
        0 => IntegrityCheck::Clear,
        references => IntegrityCheck::Blocked { references },
    }
}

/// Blocks category deletes while the story store references them.
#[derive(Debug, Clone)]
pub struct StoryReferences {
    stories: Arc<EntityStore<Story>>,
}

impl StoryReferences {
    #[must_use]
    pub fn new(stories: Arc<EntityStore<Story>>) -> Self {
        Self { stories }
    }
}

impl DeleteGuard<Category> for StoryReferences {
    fn referenced_by(&self) -> &'static str {
        Story::KIND
    }

    fn check(&self, id: &CategoryId) -> CatalogResult<IntegrityCheck> {
        self.stories.with_items(|stories| check_category_references(id, stories))
    }
}
