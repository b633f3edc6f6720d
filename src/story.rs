//! Stories: the catalog's primary content entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;
use crate::id::{CategoryId, StoryId};
use crate::seed;
use crate::store::{Entity, EntityStore};

/// A story in the catalog.
///
/// `category_id` is a soft reference: nothing checks it on create or update.
/// `views` only moves through [`Story::record_view`]; patches cannot touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub category_id: CategoryId,
    /// Running time in minutes.
    pub duration: u32,
    /// Audience label such as "3-6岁".
    pub age_range: String,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Count one view.
    pub fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }
}

/// Caller-supplied fields for a new story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    pub category_id: CategoryId,
    pub duration: u32,
    pub age_range: String,
}

impl StoryDraft {
    /// Creates a draft with the two fields every story needs; duration 0, no age range.
    #[must_use]
    pub fn new(title: impl Into<String>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            title: title.into(),
            category_id: category_id.into(),
            duration: 0,
            age_range: String::new(),
        }
    }

    #[must_use]
    pub fn duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    #[must_use]
    pub fn age_range(mut self, label: impl Into<String>) -> Self {
        self.age_range = label.into();
        self
    }
}

/// Partial update of a story. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub category_id: Option<CategoryId>,
    pub duration: Option<u32>,
    pub age_range: Option<String>,
}

impl From<StoryDraft> for StoryPatch {
    fn from(draft: StoryDraft) -> Self {
        Self {
            title: Some(draft.title),
            category_id: Some(draft.category_id),
            duration: Some(draft.duration),
            age_range: Some(draft.age_range),
        }
    }
}

impl Entity for Story {
    type Id = StoryId;
    type Draft = StoryDraft;
    type Patch = StoryPatch;

    const KIND: &'static str = "story";
    const ID_PREFIX: &'static str = "story";

    fn id(&self) -> &StoryId {
        &self.id
    }

    fn create(id: StoryId, draft: StoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            category_id: draft.category_id,
            duration: draft.duration,
            age_range: draft.age_range,
            views: 0,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: StoryPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(age_range) = patch.age_range {
            self.age_range = age_range;
        }
    }

    fn defaults() -> Vec<Self> {
        seed::default_stories()
    }
}

impl EntityStore<Story> {
    /// Viewing-event path: the only operation that changes `views`.
    ///
    /// # Errors
    /// `NotFound` if the story is absent.
    pub fn record_view(&self, id: &StoryId) -> CatalogResult<Story> {
        self.modify(id, Story::record_view)
    }

    /// Stories filed under `category_id`, in collection order.
    pub fn in_category(&self, category_id: &CategoryId) -> CatalogResult<Vec<Story>> {
        self.find(|s| &s.category_id == category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Story {
        Story::create(
            StoryId::new("story-1"),
            StoryDraft::new("The Sleepy Fox", "bedtime").duration(8).age_range("3-6岁"),
            Utc::now(),
        )
    }

    #[test]
    fn test_create_fills_derived_fields() {
        let s = story();
        assert_eq!(s.views, 0);
        assert_eq!(s.title, "The Sleepy Fox");
        assert_eq!(s.category_id.as_str(), "bedtime");
        assert_eq!(s.duration, 8);
    }

    #[test]
    fn test_apply_patch_keeps_views_and_created_at() {
        let mut s = story();
        s.record_view();
        s.record_view();
        let created = s.created_at;

        s.apply(StoryPatch {
            title: Some("The Wide-Awake Fox".to_string()),
            ..StoryPatch::default()
        });

        assert_eq!(s.title, "The Wide-Awake Fox");
        assert_eq!(s.views, 2);
        assert_eq!(s.created_at, created);
        assert_eq!(s.duration, 8);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(story()).unwrap();
        assert_eq!(json["categoryId"], "bedtime");
        assert_eq!(json["ageRange"], "3-6岁");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_missing_views_defaults_to_zero() {
        let json = r#"{"id":"s","title":"t","categoryId":"c","duration":5,"ageRange":"","createdAt":"2024-01-01T00:00:00Z"}"#;
        let s: Story = serde_json::from_str(json).unwrap();
        assert_eq!(s.views, 0);
    }
}
