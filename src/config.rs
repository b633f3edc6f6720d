//! Catalog configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::media::MediaKind;
use crate::storage::DEFAULT_EVENT_CAPACITY;
use crate::sync::SyncPolicy;

/// Storage keys used by each store.
///
/// The defaults match data already written by existing front ends.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub stories: String,
    pub categories: String,
    pub favorites: String,
    pub admin_password: String,
    /// Media kinds are stored under `<media_prefix><kind>`.
    pub media_prefix: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            stories: "stories".to_string(),
            categories: "categories".to_string(),
            favorites: "favorites".to_string(),
            admin_password: "admin_password".to_string(),
            media_prefix: "media_".to_string(),
        }
    }
}

impl StorageKeys {
    /// Key for one media partition.
    #[must_use]
    pub fn media(&self, kind: MediaKind) -> String {
        format!("{}{kind}", self.media_prefix)
    }

    /// Every concrete key, media partitions included.
    #[must_use]
    pub fn all(&self) -> Vec<(&'static str, String)> {
        let mut keys = vec![
            ("stories", self.stories.clone()),
            ("categories", self.categories.clone()),
            ("favorites", self.favorites.clone()),
            ("admin_password", self.admin_password.clone()),
        ];
        keys.extend(MediaKind::ALL.iter().map(|&k| ("media_prefix", self.media(k))));
        keys
    }
}

/// Per-store cross-context policies.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub stories: SyncPolicy,
    pub categories: SyncPolicy,
    pub media: SyncPolicy,
    pub favorites: SyncPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stories: SyncPolicy::ReloadOnly,
            categories: SyncPolicy::ReloadOnly,
            media: SyncPolicy::ReloadOnly,
            favorites: SyncPolicy::Live,
        }
    }
}

/// Top-level catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Storage keys.
    pub keys: StorageKeys,
    /// Load the built-in stories and categories when their keys are absent.
    pub seed_defaults: bool,
    /// Cross-context policies.
    pub sync: SyncConfig,
    /// Queue size of the sync listener created by `Catalog::attach`.
    pub event_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            seed_defaults: true,
            sync: SyncConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CatalogConfig {
    /// Check the configuration and hand it back.
    ///
    /// # Errors
    /// `InvalidConfig` for an empty or duplicated key, or a zero event capacity.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.keys.media_prefix.is_empty() {
            return Err(invalid("keys.media_prefix", "must not be empty"));
        }
        let mut seen = HashSet::new();
        for (field, key) in self.keys.all() {
            if key.is_empty() {
                return Err(invalid(&format!("keys.{field}"), "must not be empty"));
            }
            if !seen.insert(key.clone()) {
                return Err(invalid(&format!("keys.{field}"), &format!("key '{key}' is used twice")));
            }
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "must be greater than zero"));
        }
        Ok(self)
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CatalogConfig::default().validate().unwrap();
        assert_eq!(config.keys.media(MediaKind::Video), "media_video");
        assert_eq!(config.sync.favorites, SyncPolicy::Live);
        assert_eq!(config.sync.stories, SyncPolicy::ReloadOnly);
    }

    #[test]
    fn rejects_empty_key() {
        let mut config = CatalogConfig::default();
        config.keys.favorites = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidConfig { ref field, .. } if field == "keys.favorites"));
    }

    #[test]
    fn rejects_colliding_keys() {
        let mut config = CatalogConfig::default();
        config.keys.categories = "stories".to_string();
        assert!(config.validate().is_err());

        // "media_image" would collide with the image partition
        let mut config = CatalogConfig::default();
        config.keys.favorites = "media_image".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = CatalogConfig {
            event_capacity: 0,
            ..CatalogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"seed_defaults":false,"sync":{"stories":"live"}}"#).unwrap();
        assert!(!config.seed_defaults);
        assert_eq!(config.sync.stories, SyncPolicy::Live);
        assert_eq!(config.sync.favorites, SyncPolicy::Live);
        assert_eq!(config.keys, StorageKeys::default());
    }
}
