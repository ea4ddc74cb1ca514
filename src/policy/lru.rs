//! Least-recently-used replacement policy.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>       order: IntrusiveList<LruEntry>
//!   ┌─────────┬─────────┐             head ─► [C] ◄──► [A] ◄──► [B] ◄── tail
//!   │  key A  │  id_a   │                MRU                      LRU
//!   │  key B  │  id_b   │                                       (evicted
//!   │  key C  │  id_c   │                                         next)
//!   └─────────┴─────────┘
//! ```
//!
//! `get` and `put` on an existing key splice the entry to the front; a `put`
//! of a brand-new key at full capacity pops the back first. Every operation
//! is O(1) average: the index resolves a key to its list handle, and all list
//! splices are handle-based.
//!
//! [`LruCore`] is the single-threaded engine; [`LruCache`] wraps it in one
//! `parking_lot::Mutex` and implements [`BoundedCache`]. Values are stored as
//! `Arc<V>` so `get` can hand out an owned handle without copying `V`.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{CacheError, Result};
use crate::traits::BoundedCache;

struct LruEntry<K, V> {
    key: K,
    value: Arc<V>,
}

/// Single-threaded LRU engine: recency list + direct index.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use memokit::policy::lru::LruCore;
///
/// let mut core = LruCore::new(2).unwrap();
/// core.insert(1, Arc::new("a"));
/// core.insert(2, Arc::new("b"));
/// core.get(&1);            // 1 becomes MRU
/// core.insert(3, Arc::new("c"));
/// assert!(!core.contains(&2)); // 2 was LRU
/// assert!(core.contains(&1));
/// ```
pub struct LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    order: IntrusiveList<LruEntry<K, V>>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU core; fails with `InvalidCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity);
        }
        Ok(Self {
            index: FxHashMap::default(),
            order: IntrusiveList::with_capacity(capacity),
            capacity,
        })
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.order.move_to_front(id);
        self.order.get(id).map(|entry| Arc::clone(&entry.value))
    }

    /// Returns the value for `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| Arc::clone(&entry.value))
    }

    /// Inserts or overwrites `key`, returning the previous value if any.
    ///
    /// A brand-new key at full capacity evicts the least-recently-used entry
    /// before insertion; the new entry lands at the MRU end either way.
    pub fn insert(&mut self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_front(id);
            let entry = self.order.get_mut(id)?;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        if self.index.len() >= self.capacity {
            let _ = self.pop_lru();
        }

        let id = self.order.push_front(LruEntry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let id = self.index.remove(key)?;
        self.order.remove(id).map(|entry| entry.value)
    }

    /// Removes and returns the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(K, Arc<V>)> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Returns the least-recently-used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &Arc<V>)> {
        self.order.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Marks `key` most recently used without reading it; returns `false` if
    /// absent.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.order.move_to_front(id),
            None => false,
        }
    }

    /// Returns `true` if `key` is resident. Does not promote.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.order.len());
        assert!(self.order.len() <= self.capacity);
        for (key, &id) in &self.index {
            let entry = self.order.get(id).expect("indexed entry missing");
            assert!(entry.key == *key, "index handle points at wrong entry");
        }
        self.order.debug_validate_invariants();
    }
}

impl<K, V> std::fmt::Debug for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Thread-safe LRU cache implementing [`BoundedCache`].
///
/// All operations take one exclusive lock over the whole recency state.
///
/// # Example
///
/// ```
/// use memokit::policy::lru::LruCache;
/// use memokit::traits::BoundedCache;
///
/// let cache = LruCache::new(3).unwrap();
/// cache.put(1, "one".to_string()).unwrap();
/// cache.put(2, "two".to_string()).unwrap();
/// cache.put(3, "three".to_string()).unwrap();
/// cache.get(&1).unwrap();               // protects 1 from eviction
/// cache.put(4, "four".to_string()).unwrap();
/// assert!(!cache.contains(&2));         // 2 was least recently used
/// assert!(cache.contains(&1));
/// ```
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache; fails with `InvalidCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(LruCore::new(capacity)?),
        })
    }
}

impl<K, V> BoundedCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<Arc<V>> {
        self.inner.lock().get(key).ok_or(CacheError::NotFound)
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        self.inner.lock().insert(key, Arc::new(value));
        Ok(())
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    fn erase(&self, key: &K) -> Result<()> {
        self.inner
            .lock()
            .remove(key)
            .map(|_| ())
            .ok_or(CacheError::NotFound)
    }

    fn clear(&self) {
        self.inner.lock().clear();
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
