//! One origin, many browsing contexts.
//!
//! [`SharedStorage`] owns the origin-wide storage area. Each tab obtains a
//! [`BrowsingContext`] from it; writes through a context land in the shared
//! area and are announced to every other context's subscriptions. There is no
//! locking across contexts: concurrent full-value writes resolve as last write
//! wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Sender, TrySendError};

use super::event::{ContextId, StorageEvent, StorageEventStream, SubscriptionId};
use super::traits::{StorageArea, StorageError};

/// Default per-subscription queue capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Subscriber {
    context: ContextId,
    tx: Sender<StorageEvent>,
}

/// Subscription registry shared by all contexts of one origin.
#[derive(Debug)]
pub(crate) struct Registry {
    subscribers: Mutex<HashMap<SubscriptionId, Subscriber>>,
    capacity: usize,
    dropped_events: AtomicU64,
}

impl Registry {
    fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            dropped_events: AtomicU64::new(0),
        }
    }

    pub(crate) fn unregister(&self, id: SubscriptionId) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.remove(&id);
        }
    }

    fn register(self: &Arc<Self>, context: ContextId, capacity: usize) -> StorageEventStream {
        let (tx, rx) = bounded(capacity.max(1));
        let id = SubscriptionId::new();
        match self.subscribers.lock() {
            Ok(mut subs) => {
                subs.insert(id, Subscriber { context, tx });
            }
            Err(_) => tracing::warn!(%context, "subscriber registry poisoned; stream will stay silent"),
        }
        StorageEventStream::new(id, rx, Arc::clone(self))
    }

    /// Best-effort fan-out: never blocks the writer.
    fn broadcast(&self, event: &StorageEvent) {
        let Ok(mut subs) = self.subscribers.lock() else {
            tracing::warn!(key = %event.key, "subscriber registry poisoned; event not delivered");
            return;
        };

        let mut disconnected = Vec::new();
        for (id, sub) in subs.iter() {
            if sub.context == event.source {
                continue;
            }
            match sub.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped_events.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(key = %event.key, context = %sub.context, "storage event queue full; event dropped");
                }
                Err(TrySendError::Disconnected(_)) => disconnected.push(*id),
            }
        }
        for id in disconnected {
            subs.remove(&id);
        }
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// The storage of one origin, shared by every context attached to it.
#[derive(Clone)]
pub struct SharedStorage {
    area: Arc<dyn StorageArea>,
    registry: Arc<Registry>,
}

impl SharedStorage {
    /// Wrap an origin-wide area with the default event capacity.
    #[must_use]
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self::with_capacity(area, DEFAULT_EVENT_CAPACITY)
    }

    /// Wrap an origin-wide area; each subscription buffers up to `capacity` events.
    #[must_use]
    pub fn with_capacity(area: Arc<dyn StorageArea>, capacity: usize) -> Self {
        Self {
            area,
            registry: Arc::new(Registry::new(capacity)),
        }
    }

    /// Attach a new browsing context.
    #[must_use]
    pub fn context(&self) -> BrowsingContext {
        BrowsingContext {
            id: ContextId::new(),
            area: Arc::clone(&self.area),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Number of events dropped because a subscriber queue was full.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.registry.dropped_events.load(Ordering::Relaxed)
    }

    /// Number of live subscriptions across all contexts.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.subscriber_count()
    }
}

impl std::fmt::Debug for SharedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStorage")
            .field("items", &self.area.len())
            .field("subscribers", &self.registry.subscriber_count())
            .finish()
    }
}

/// One tab's view of a shared origin.
///
/// Implements [`StorageArea`] so stores can be built on it directly.
#[derive(Clone)]
pub struct BrowsingContext {
    id: ContextId,
    area: Arc<dyn StorageArea>,
    registry: Arc<Registry>,
}

impl BrowsingContext {
    /// This context's id; events it causes carry it as `source`.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// Subscribe to changes made by other contexts, buffering up to the
    /// origin's default capacity.
    #[must_use]
    pub fn subscribe(&self) -> StorageEventStream {
        self.registry.register(self.id, self.registry.capacity)
    }

    /// Subscribe with a queue of `capacity` events. Events arriving while the
    /// queue is full are dropped and counted.
    #[must_use]
    pub fn subscribe_with_capacity(&self, capacity: usize) -> StorageEventStream {
        self.registry.register(self.id, capacity)
    }

    fn announce(&self, key: &str, old_value: Option<String>, new_value: Option<String>) {
        if old_value == new_value {
            return;
        }
        self.registry.broadcast(&StorageEvent {
            key: key.to_string(),
            old_value,
            new_value,
            source: self.id,
        });
    }
}

impl std::fmt::Debug for BrowsingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowsingContext").field("id", &self.id).finish()
    }
}

impl StorageArea for BrowsingContext {
    fn get_item(&self, key: &str) -> Option<String> {
        self.area.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_value = self.area.get_item(key);
        self.area.set_item(key, value)?;
        self.announce(key, old_value, Some(value.to_string()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let old_value = self.area.get_item(key);
        self.area.remove_item(key)?;
        self.announce(key, old_value, None);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.area.keys()
    }

    fn len(&self) -> usize {
        self.area.len()
    }
}
