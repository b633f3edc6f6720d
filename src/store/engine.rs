//! Generic entity store engine.
//!
//! One `EntityStore` owns one entity kind's collection and mirrors it, in
//! order and in full, to a single key of the storage area. The collection is
//! read lazily on first access. Every mutation is applied to a copy, written
//! through, and only then made visible, so a rejected write leaves both memory
//! and storage at the previous snapshot.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::error::{CatalogError, CatalogResult};
use crate::id::IdAllocator;
use crate::storage::{StorageArea, StorageError};
use crate::sync::SyncPolicy;

use super::entity::Entity;
use super::integrity::{DeleteGuard, IntegrityCheck};

fn lock_err(context: &'static str) -> CatalogError {
    CatalogError::Persistence(StorageError::Backend(format!("poisoned lock: {context}")))
}

enum Outcome<R> {
    Changed(R),
    Unchanged(R),
}

/// CRUD collection manager for one entity kind.
pub struct EntityStore<E: Entity> {
    area: Arc<dyn StorageArea>,
    key: String,
    ids: Arc<IdAllocator>,
    seed_defaults: bool,
    sync_policy: SyncPolicy,
    guard: Option<Arc<dyn DeleteGuard<E>>>,
    // `None` until first access.
    items: RwLock<Option<Vec<E>>>,
}

impl<E: Entity> EntityStore<E> {
    /// Create a store persisting under `key`.
    ///
    /// Defaults: seeds the built-in collection when the key is absent,
    /// [`SyncPolicy::ReloadOnly`], no delete guard.
    #[must_use]
    pub fn new(area: Arc<dyn StorageArea>, key: impl Into<String>, ids: Arc<IdAllocator>) -> Self {
        Self {
            area,
            key: key.into(),
            ids,
            seed_defaults: true,
            sync_policy: SyncPolicy::ReloadOnly,
            guard: None,
            items: RwLock::new(None),
        }
    }

    /// Whether an absent key loads the built-in collection (`true`) or an empty one.
    #[must_use]
    pub fn seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }

    /// Declare how this store reacts to writes made by other contexts.
    #[must_use]
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.sync_policy = policy;
        self
    }

    /// Consult `guard` before every delete.
    #[must_use]
    pub fn with_guard(mut self, guard: Arc<dyn DeleteGuard<E>>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Storage key this store writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared cross-context policy.
    #[must_use]
    pub const fn policy(&self) -> SyncPolicy {
        self.sync_policy
    }

    /// The full collection, in insertion order.
    pub fn list(&self) -> CatalogResult<Vec<E>> {
        self.with_items(<[E]>::to_vec)
    }

    /// Look up one record.
    pub fn get(&self, id: &E::Id) -> CatalogResult<Option<E>> {
        self.with_items(|items| items.iter().find(|e| e.id() == id).cloned())
    }

    /// All records matching `predicate`, in collection order.
    pub fn find(&self, predicate: impl Fn(&E) -> bool) -> CatalogResult<Vec<E>> {
        self.with_items(|items| items.iter().filter(|e| predicate(e)).cloned().collect())
    }

    /// Number of records.
    pub fn len(&self) -> CatalogResult<usize> {
        self.with_items(<[E]>::len)
    }

    /// Returns true if the collection is empty.
    pub fn is_empty(&self) -> CatalogResult<bool> {
        self.with_items(<[E]>::is_empty)
    }

    /// Create a record with a fresh id and append it.
    ///
    /// # Errors
    /// `Persistence` if the storage area rejects the write.
    pub fn add(&self, draft: E::Draft) -> CatalogResult<E> {
        let id: E::Id = self.ids.next(E::ID_PREFIX);
        let entity = E::create(id, draft, Utc::now());
        let created = entity.clone();
        self.mutate(move |items| {
            items.push(entity);
            Ok(Outcome::Changed(()))
        })?;
        tracing::debug!(kind = E::KIND, id = %created.id(), "added");
        Ok(created)
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// # Errors
    /// `NotFound` if absent, `Persistence` if the write is rejected.
    pub fn update(&self, id: &E::Id, patch: E::Patch) -> CatalogResult<E> {
        self.modify(id, move |entity| entity.apply(patch))
    }

    /// Apply `f` to the record with `id` and persist the result.
    pub(crate) fn modify(&self, id: &E::Id, f: impl FnOnce(&mut E)) -> CatalogResult<E> {
        let updated = self.mutate(|items| {
            let entity = items
                .iter_mut()
                .find(|e| e.id() == id)
                .ok_or_else(|| CatalogError::not_found(E::KIND, id.to_string()))?;
            f(entity);
            Ok(Outcome::Changed(entity.clone()))
        })?;
        tracing::debug!(kind = E::KIND, %id, "updated");
        Ok(updated)
    }

    /// Remove the record with `id`, returning whether anything was removed.
    ///
    /// When a delete guard is installed it is consulted first, and a blocked
    /// delete returns `ValidationConflict` with both storage and memory untouched.
    pub fn delete(&self, id: &E::Id) -> CatalogResult<bool> {
        if let Some(guard) = &self.guard {
            if self.get(id)?.is_some() {
                if let IntegrityCheck::Blocked { references } = guard.check(id)? {
                    tracing::warn!(kind = E::KIND, %id, references, "delete blocked by references");
                    return Err(CatalogError::ValidationConflict {
                        kind: E::KIND,
                        id: id.to_string(),
                        referenced_by: guard.referenced_by(),
                        references,
                    });
                }
            }
        }

        let removed = self.mutate(|items| match items.iter().position(|e| e.id() == id) {
            Some(idx) => {
                items.remove(idx);
                Ok(Outcome::Changed(true))
            }
            None => Ok(Outcome::Unchanged(false)),
        })?;
        if removed {
            tracing::debug!(kind = E::KIND, %id, "deleted");
        }
        Ok(removed)
    }

    /// Discard the in-memory collection and read it again from storage.
    pub fn reload(&self) -> CatalogResult<()> {
        let fresh = self.load_from_area();
        let mut guard = self.items.write().map_err(|_| lock_err("entity_store.reload"))?;
        *guard = Some(fresh);
        tracing::debug!(kind = E::KIND, key = %self.key, "reloaded");
        Ok(())
    }

    pub(crate) fn with_items<R>(&self, f: impl FnOnce(&[E]) -> R) -> CatalogResult<R> {
        {
            let guard = self.items.read().map_err(|_| lock_err("entity_store.read"))?;
            if let Some(items) = guard.as_deref() {
                return Ok(f(items));
            }
        }
        let mut guard = self.items.write().map_err(|_| lock_err("entity_store.load"))?;
        let items = guard.get_or_insert_with(|| self.load_from_area());
        Ok(f(items))
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<E>) -> CatalogResult<Outcome<R>>) -> CatalogResult<R> {
        let mut guard = self.items.write().map_err(|_| lock_err("entity_store.write"))?;
        let current = guard.get_or_insert_with(|| self.load_from_area());

        let mut next = current.clone();
        match f(&mut next)? {
            Outcome::Unchanged(out) => Ok(out),
            Outcome::Changed(out) => {
                self.persist(&next)?;
                *current = next;
                Ok(out)
            }
        }
    }

    fn persist(&self, items: &[E]) -> CatalogResult<()> {
        let raw = serde_json::to_string(items).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.area.set_item(&self.key, &raw).map_err(|err| {
            tracing::warn!(kind = E::KIND, key = %self.key, error = %err, "write rejected");
            CatalogError::Persistence(err)
        })
    }

    fn fallback(&self) -> Vec<E> {
        if self.seed_defaults {
            tracing::info!(kind = E::KIND, key = %self.key, "nothing persisted; using built-in collection");
            E::defaults()
        } else {
            Vec::new()
        }
    }

    // Unreadable data fails closed to the first-run collection.
    fn load_from_area(&self) -> Vec<E> {
        let Some(raw) = self.area.get_item(&self.key) else {
            return self.fallback();
        };
        match serde_json::from_str::<Vec<E>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(kind = E::KIND, key = %self.key, error = %err, "stored collection unreadable; treating as absent");
                self.fallback()
            }
        }
    }
}

impl<E: Entity> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &E::KIND)
            .field("key", &self.key)
            .field("sync_policy", &self.sync_policy)
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}
