//! Categories group stories for browsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::CategoryId;
use crate::seed;
use crate::store::Entity;

/// A browsing category.
///
/// `icon` and `color` are symbolic tokens interpreted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

/// Caller-supplied fields for a new category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

impl CategoryDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl From<CategoryDraft> for CategoryPatch {
    fn from(draft: CategoryDraft) -> Self {
        Self {
            name: Some(draft.name),
            description: Some(draft.description),
            icon: Some(draft.icon),
            color: Some(draft.color),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;
    type Draft = CategoryDraft;
    type Patch = CategoryPatch;

    const KIND: &'static str = "category";
    const ID_PREFIX: &'static str = "category";

    fn id(&self) -> &CategoryId {
        &self.id
    }

    fn create(id: CategoryId, draft: CategoryDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            icon: draft.icon,
            color: draft.color,
        }
    }

    fn apply(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }

    fn defaults() -> Vec<Self> {
        seed::default_categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_draft_as_patch_replaces_every_field() {
        let mut c = Category::create(
            CategoryId::new("c1"),
            CategoryDraft::new("Bedtime").icon("fa-moon").color("bg-blue-400"),
            Utc::now(),
        );
        c.apply(CategoryDraft::new("Animals").description("Furry friends").into());

        assert_eq!(c.id.as_str(), "c1");
        assert_eq!(c.name, "Animals");
        assert_eq!(c.description, "Furry friends");
        assert_eq!(c.icon, "");
    }

    #[test]
    fn test_partial_patch() {
        let mut c = Category::create(CategoryId::new("c1"), CategoryDraft::new("Bedtime"), Utc::now());
        c.apply(CategoryPatch {
            color: Some("bg-purple-400".to_string()),
            ..CategoryPatch::default()
        });
        assert_eq!(c.name, "Bedtime");
        assert_eq!(c.color, "bg-purple-400");
    }
}
