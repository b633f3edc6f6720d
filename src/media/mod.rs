//! Media assets: durable metadata plus a session-only payload cache.
//!
//! The catalog keeps two explicit layers for uploaded media:
//! - metadata records, one list per [`MediaKind`], persisted like any other
//!   entity collection;
//! - the payload behind each record's [`TransientHandle`], held by a
//!   [`HandleCache`] for the lifetime of the process only.
//!
//! After a reload the metadata is intact and every handle resolves to nothing.
//! That is the expected state, not data loss to be repaired.

mod handles;
mod registry;

pub use handles::HandleCache;
pub use registry::MediaRegistry;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::MediaId;
use crate::store::Entity;

/// Media partition. Each kind is stored under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Image, Self::Video, Self::Audio];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// Reference to an uploaded payload, valid only in the session that minted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransientHandle(String);

impl TransientHandle {
    const SCHEME: &'static str = "blob:session/";

    /// Mint a fresh handle.
    #[must_use]
    pub fn mint() -> Self {
        Self(format!("{}{}", Self::SCHEME, Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata of one uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssetRecord {
    pub id: MediaId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Session-scoped handle; dangling once the process that minted it is gone.
    pub url: TransientHandle,
    /// Payload size in bytes.
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MediaDraft {
    pub name: String,
    pub kind: MediaKind,
    pub handle: TransientHandle,
    pub size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MediaPatch {
    pub name: Option<String>,
}

impl Entity for MediaAssetRecord {
    type Id = MediaId;
    type Draft = MediaDraft;
    type Patch = MediaPatch;

    const KIND: &'static str = "media asset";
    const ID_PREFIX: &'static str = "media";

    fn id(&self) -> &MediaId {
        &self.id
    }

    fn create(id: MediaId, draft: MediaDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind,
            url: draft.handle,
            size: draft.size,
            uploaded_at: now,
        }
    }

    fn apply(&mut self, patch: MediaPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in MediaKind::ALL {
            assert_eq!(kind.as_str().parse::<MediaKind>().unwrap(), kind);
        }
        assert!("pdf".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_handles_are_unique_session_urls() {
        let a = TransientHandle::mint();
        let b = TransientHandle::mint();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:session/"));
    }

    #[test]
    fn test_record_wire_shape() {
        let record = MediaAssetRecord::create(
            MediaId::new("media-1-abc"),
            MediaDraft {
                name: "fox.png".to_string(),
                kind: MediaKind::Image,
                handle: TransientHandle::mint(),
                size: 42,
            },
            Utc::now(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["size"], 42);
        assert!(json["url"].as_str().unwrap().starts_with("blob:"));
        assert!(json.get("uploadedAt").is_some());
    }
}
