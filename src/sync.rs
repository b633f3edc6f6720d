//! Cross-context synchronization.
//!
//! Every store declares a [`SyncPolicy`]. A [`SyncListener`] owns one
//! context's [`StorageEventStream`] and forwards each foreign change to the
//! stores that watch the changed key and declared [`SyncPolicy::Live`].
//! Stores declaring [`SyncPolicy::ReloadOnly`] keep whatever they loaded until
//! the caller reloads them explicitly; they must not be assumed fresh.
//!
//! Delivery is best-effort: events may arrive late, and a queue that overflows
//! drops events. There is no reconciliation beyond re-reading the latest value.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;
use crate::media::{MediaKind, MediaRegistry};
use crate::storage::{StorageEvent, StorageEventStream};
use crate::store::{Entity, EntityStore};

/// How a store reacts to writes made by other browsing contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Refresh as soon as a change notification for a watched key arrives.
    Live,
    /// Ignore notifications; re-read only on explicit reload.
    ReloadOnly,
}

impl SyncPolicy {
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// A store that can take part in cross-context synchronization.
pub trait SyncParticipant: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Storage keys this participant mirrors.
    fn watched_keys(&self) -> Vec<String>;

    /// Declared policy.
    fn policy(&self) -> SyncPolicy;

    /// Called when another context changed `key`.
    fn on_external_change(&self, key: &str) -> CatalogResult<()>;
}

impl<E: Entity> SyncParticipant for EntityStore<E> {
    fn name(&self) -> &str {
        E::KIND
    }

    fn watched_keys(&self) -> Vec<String> {
        vec![self.key().to_string()]
    }

    fn policy(&self) -> SyncPolicy {
        EntityStore::policy(self)
    }

    fn on_external_change(&self, _key: &str) -> CatalogResult<()> {
        self.reload()
    }
}

impl SyncParticipant for MediaRegistry {
    fn name(&self) -> &str {
        "media"
    }

    fn watched_keys(&self) -> Vec<String> {
        MediaKind::ALL
            .iter()
            .map(|&kind| self.partition(kind).key().to_string())
            .collect()
    }

    fn policy(&self) -> SyncPolicy {
        self.partition(MediaKind::Image).policy()
    }

    fn on_external_change(&self, key: &str) -> CatalogResult<()> {
        for kind in MediaKind::ALL {
            let partition = self.partition(kind);
            if partition.key() == key {
                return partition.reload();
            }
        }
        Ok(())
    }
}

/// Routes storage events from other contexts to live participants.
pub struct SyncListener {
    events: StorageEventStream,
    participants: Vec<Arc<dyn SyncParticipant>>,
}

impl SyncListener {
    #[must_use]
    pub fn new(events: StorageEventStream) -> Self {
        Self {
            events,
            participants: Vec::new(),
        }
    }

    /// Register a participant. Only [`SyncPolicy::Live`] participants are kept;
    /// returns whether this one was.
    pub fn register(&mut self, participant: Arc<dyn SyncParticipant>) -> bool {
        if !participant.policy().is_live() {
            tracing::debug!(participant = participant.name(), "reload-only; not listening");
            return false;
        }
        tracing::debug!(participant = participant.name(), keys = ?participant.watched_keys(), "listening");
        self.participants.push(participant);
        true
    }

    /// Names of the registered participants.
    #[must_use]
    pub fn participants(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name().to_string()).collect()
    }

    /// Handle every queued event without blocking. Returns how many refreshes ran.
    pub fn poll(&self) -> usize {
        self.events.drain().iter().map(|event| self.dispatch(event)).sum()
    }

    /// Block up to `timeout` for one event, then handle it and anything else queued.
    pub fn wait(&self, timeout: Duration) -> usize {
        match self.events.recv_timeout(timeout) {
            Some(first) => self.dispatch(&first) + self.poll(),
            None => 0,
        }
    }

    fn dispatch(&self, event: &StorageEvent) -> usize {
        let mut refreshed = 0;
        for participant in &self.participants {
            if !participant.watched_keys().iter().any(|k| k == &event.key) {
                continue;
            }
            match participant.on_external_change(&event.key) {
                Ok(()) => refreshed += 1,
                Err(err) => tracing::warn!(
                    participant = participant.name(),
                    key = %event.key,
                    error = %err,
                    "refresh after external change failed"
                ),
            }
        }
        refreshed
    }
}

impl std::fmt::Debug for SyncListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncListener")
            .field("subscription", &self.events.subscription_id())
            .field("participants", &self.participants())
            .finish()
    }
}
