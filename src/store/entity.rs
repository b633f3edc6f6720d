use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A kind of record managed by an [`EntityStore`](super::EntityStore).
///
/// Implementors describe how a record is created from caller input, how a
/// partial update is merged, and what the first-run collection looks like.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type; allocated ids arrive as strings.
    type Id: Clone + Eq + fmt::Debug + fmt::Display + From<String> + Send + Sync;
    /// Fields supplied on creation (everything except id and derived fields).
    type Draft;
    /// Partial update; fields left unset are kept.
    type Patch;

    /// Human-readable kind, used in errors and logs.
    const KIND: &'static str;
    /// Prefix for allocated ids.
    const ID_PREFIX: &'static str;

    fn id(&self) -> &Self::Id;

    /// Build a new record, filling derived fields.
    fn create(id: Self::Id, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merge a partial update into this record.
    fn apply(&mut self, patch: Self::Patch);

    /// Collection used when nothing has been persisted yet.
    fn defaults() -> Vec<Self> {
        Vec::new()
    }
}
