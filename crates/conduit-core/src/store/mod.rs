//! Identity stores.
//!
//! Backend handles (frames, threads, values, modules, ...) only exist inside the
//! backend's address space. Before anything about them can cross the RPC boundary
//! it is registered in a store, and the client gets an [`ObjectId`] back. Later
//! requests carry that id and the service layer turns it back into the handle.
//!
//! Two stores exist:
//!
//! - [`ObjectStore`] hands out a fresh id on every add. It suits short-lived
//!   handles such as frames and values, where each registration is its own
//!   client-side object.
//! - [`UniqueObjectStore`] deduplicates through an injected
//!   [`IdentityComparer`] and reference-counts each identity. Modules use it so
//!   that the same binary always maps to the same id.
//!
//! Both stores own their counter: two stores never share an id space, and an id
//! is never handed out twice by the same store.

pub mod comparer;
pub mod unique;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use comparer::{BuildIdComparer, HasBuildId, IdentityComparer, ValueComparer};
pub use unique::UniqueObjectStore;

use crate::error::{BridgeError, Result};

/// Stable identifier standing in for a backend handle on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId
{
    /// Create a new identifier from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self
    {
        Self(value)
    }

    /// Get the raw numeric representation (what goes on the wire).
    #[must_use]
    pub const fn raw(self) -> u64
    {
        self.0
    }
}

impl fmt::Display for ObjectId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source owned by a single store.
///
/// Ids start at 1 so that 0 never names a live object.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator
{
    last: u64,
}

impl IdAllocator
{
    pub(crate) fn allocate(&mut self) -> ObjectId
    {
        self.last += 1;
        ObjectId::from_raw(self.last)
    }
}

/// Lock a store mutex, recovering the data if a previous holder panicked.
///
/// Every store mutation leaves the maps consistent before it can panic, so the
/// inner value is still valid after poisoning.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T>
{
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct ObjectStoreInner<T>
{
    ids: IdAllocator,
    objects: HashMap<ObjectId, T>,
}

/// Thread-safe store that assigns a new id to every object added.
///
/// ```rust
/// use conduit_core::store::ObjectStore;
///
/// let store = ObjectStore::new();
/// let first = store.add_object("frame #0");
/// let second = store.add_object("frame #0");
/// assert_ne!(first, second);
/// assert_eq!(store.get_object(first).unwrap(), "frame #0");
/// ```
#[derive(Debug)]
pub struct ObjectStore<T>
{
    inner: Mutex<ObjectStoreInner<T>>,
}

impl<T> Default for ObjectStore<T>
{
    fn default() -> Self
    {
        Self {
            inner: Mutex::new(ObjectStoreInner {
                ids: IdAllocator::default(),
                objects: HashMap::new(),
            }),
        }
    }
}

impl<T> ObjectStore<T>
{
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Register `object` and return its new id.
    pub fn add_object(&self, object: T) -> ObjectId
    {
        let mut inner = lock(&self.inner);
        let id = inner.ids.allocate();
        inner.objects.insert(id, object);
        id
    }

    /// Drop the object registered under `id`.
    ///
    /// ## Errors
    ///
    /// `ObjectNotFound` if `id` is not live.
    pub fn remove_object(&self, id: ObjectId) -> Result<()>
    {
        lock(&self.inner)
            .objects
            .remove(&id)
            .map(|_| ())
            .ok_or(BridgeError::ObjectNotFound(id))
    }

    /// Number of live objects.
    pub fn count(&self) -> usize
    {
        lock(&self.inner).objects.len()
    }
}

impl<T: Clone> ObjectStore<T>
{
    /// Fetch a clone of the object registered under `id`.
    ///
    /// ## Errors
    ///
    /// `ObjectNotFound` if `id` was never issued or has been removed.
    pub fn get_object(&self, id: ObjectId) -> Result<T>
    {
        lock(&self.inner)
            .objects
            .get(&id)
            .cloned()
            .ok_or(BridgeError::ObjectNotFound(id))
    }
}
