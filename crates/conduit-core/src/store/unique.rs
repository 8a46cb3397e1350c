//! Deduplicating, reference-counted identity store.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::trace;

use super::comparer::IdentityComparer;
use super::{lock, IdAllocator, ObjectId};
use crate::error::{BridgeError, Result};

#[derive(Debug)]
struct Entry<T, K>
{
    object: T,
    key: K,
    count: usize,
}

#[derive(Debug)]
struct Inner<T, K>
{
    ids: IdAllocator,
    by_id: HashMap<ObjectId, Entry<T, K>>,
    by_key: HashMap<K, ObjectId>,
}

/// Thread-safe store that maps every identity to exactly one [`ObjectId`].
///
/// Adding a handle the comparer considers equal to a live one returns the
/// existing id and bumps its reference count. [`remove_object`] undoes one add;
/// when the count reaches zero the mapping disappears and the id is dead for good.
///
/// A single mutex guards the counter and both maps, so concurrent adds of equal
/// handles from different RPC threads can never produce two ids.
///
/// ```rust
/// use conduit_core::store::{BuildIdComparer, HasBuildId, UniqueObjectStore};
///
/// #[derive(Clone)]
/// struct Module
/// {
///     path: &'static str,
///     build_id: &'static str,
/// }
///
/// impl HasBuildId for Module
/// {
///     fn build_id(&self) -> String
///     {
///         self.build_id.to_string()
///     }
/// }
///
/// let store = UniqueObjectStore::new(BuildIdComparer);
/// let a = store.add_object(Module { path: "/srv/game", build_id: "c0ffee" });
/// let b = store.add_object(Module { path: "/mnt/game", build_id: "c0ffee" });
/// assert_eq!(a, b);
/// assert_eq!(store.count(), 1);
/// ```
///
/// [`remove_object`]: UniqueObjectStore::remove_object
#[derive(Debug)]
pub struct UniqueObjectStore<T, C>
where
    C: IdentityComparer<T>,
{
    comparer: C,
    inner: Mutex<Inner<T, C::Key>>,
}

impl<T, C> UniqueObjectStore<T, C>
where
    C: IdentityComparer<T>,
{
    /// Create an empty store using `comparer` as the identity rule.
    pub fn new(comparer: C) -> Self
    {
        Self {
            comparer,
            inner: Mutex::new(Inner {
                ids: IdAllocator::default(),
                by_id: HashMap::new(),
                by_key: HashMap::new(),
            }),
        }
    }

    /// Register `object`, returning the id of its identity.
    ///
    /// The first add of an identity allocates a new id with a count of 1. Later
    /// adds of an equal handle return the same id and increment the count; the
    /// originally stored handle is kept.
    pub fn add_object(&self, object: T) -> ObjectId
    {
        // Computed outside the lock; the comparer may call into the backend.
        let key = self.comparer.identity(&object);

        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        if let Some(&id) = inner.by_key.get(&key) {
            if let Some(entry) = inner.by_id.get_mut(&id) {
                entry.count += 1;
                trace!(id = id.raw(), count = entry.count, "identity already registered");
                return id;
            }
        }

        let id = inner.ids.allocate();
        inner.by_key.insert(key.clone(), id);
        inner.by_id.insert(id, Entry { object, key, count: 1 });
        trace!(id = id.raw(), "registered new identity");
        id
    }

    /// Undo one [`add_object`](Self::add_object) for `id`.
    ///
    /// ## Errors
    ///
    /// `ObjectNotFound` if `id` is not live.
    pub fn remove_object(&self, id: ObjectId) -> Result<()>
    {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        let entry = inner.by_id.get_mut(&id).ok_or(BridgeError::ObjectNotFound(id))?;
        entry.count -= 1;
        if entry.count == 0 {
            if let Some(entry) = inner.by_id.remove(&id) {
                inner.by_key.remove(&entry.key);
            }
            trace!(id = id.raw(), "identity released");
        }
        Ok(())
    }

    /// Number of live identities (not the sum of reference counts).
    pub fn count(&self) -> usize
    {
        lock(&self.inner).by_id.len()
    }

    /// Current reference count of `id`, or `None` if it is not live.
    pub fn reference_count(&self, id: ObjectId) -> Option<usize>
    {
        lock(&self.inner).by_id.get(&id).map(|entry| entry.count)
    }
}

impl<T, C> UniqueObjectStore<T, C>
where
    T: Clone,
    C: IdentityComparer<T>,
{
    /// Fetch a clone of the handle registered under `id`.
    ///
    /// ## Errors
    ///
    /// `ObjectNotFound` if `id` was never issued or has been fully removed.
    pub fn get_object(&self, id: ObjectId) -> Result<T>
    {
        lock(&self.inner)
            .by_id
            .get(&id)
            .map(|entry| entry.object.clone())
            .ok_or(BridgeError::ObjectNotFound(id))
    }
}

impl<T, C> Default for UniqueObjectStore<T, C>
where
    C: IdentityComparer<T> + Default,
{
    fn default() -> Self
    {
        Self::new(C::default())
    }
}
