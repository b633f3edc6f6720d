//! Storage change notifications.
//!
//! A [`StorageEvent`] is delivered to every browsing context sharing an
//! origin except the one that made the change. Events are delivered through
//! a [`StorageEventStream`]; dropping the stream unregisters it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::Registry;

/// Identifies one browsing context (a tab) attached to a shared origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Creates a new random context id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A change to one key made by another browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed.
    pub key: String,
    /// Value before the change, if any.
    pub old_value: Option<String>,
    /// Value after the change; `None` when the key was removed.
    pub new_value: Option<String>,
    /// The context that made the change.
    pub source: ContextId,
}

/// Receiving end of a storage event subscription.
///
/// Dropping this stream unregisters it.
#[derive(Debug)]
pub struct StorageEventStream {
    subscription_id: SubscriptionId,
    rx: Receiver<StorageEvent>,
    registry: Arc<Registry>,
    unregistered: AtomicBool,
}

impl StorageEventStream {
    pub(crate) fn new(
        subscription_id: SubscriptionId,
        rx: Receiver<StorageEvent>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            subscription_id,
            rx,
            registry,
            unregistered: AtomicBool::new(false),
        }
    }

    /// The subscription id backing this stream.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    /// Explicit unregistration. Idempotent; events already queued stay readable.
    pub fn unsubscribe(&self) {
        if self.unregistered.swap(true, Ordering::AcqRel) {
            return;
        }
        self.registry.unregister(self.subscription_id);
    }

    /// Receive the next event, blocking until one arrives.
    ///
    /// Returns `None` once the stream is unsubscribed and drained.
    pub fn recv(&self) -> Option<StorageEvent> {
        self.rx.recv().ok()
    }

    /// Receive the next event without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<StorageEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Receive the next event, giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StorageEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Take every event currently queued.
    #[must_use]
    pub fn drain(&self) -> Vec<StorageEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for StorageEventStream {
    fn drop(&mut self) {
        if !self.unregistered.swap(true, Ordering::AcqRel) {
            self.registry.unregister(self.subscription_id);
        }
    }
}
