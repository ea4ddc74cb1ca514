//! Least-frequently-used replacement policy.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>     order: IntrusiveList<LfuEntry>
//!   ┌─────────┬─────────┐           head ─► [A:5] ◄──► [C:2] ◄──► [B:1] ◄── tail
//!   │  key A  │  id_a   │             highest count        lowest count
//!   │  key B  │  id_b   │                                  (evicted next)
//!   │  key C  │  id_c   │
//!   └─────────┴─────────┘
//! ```
//!
//! The ordering is kept sorted by descending access count. On `get` or
//! re-`put` the entry's count increments and the entry bubbles forward past
//! every predecessor with a strictly lower count — a local splice, not a full
//! re-sort — so the back of the list is always the global minimum and
//! eviction on overflow is O(1).
//!
//! Tie-break on equal counts: the bubble stops at the first predecessor with
//! an equal (or higher) count, so among entries with the same count the one
//! whose count changed most recently sits nearest the back and is evicted
//! first. New entries enter at the back with count 1.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{CacheError, Result};
use crate::traits::BoundedCache;

struct LfuEntry<K, V> {
    key: K,
    value: Arc<V>,
    count: u64,
}

/// Single-threaded LFU engine: count-ordered list + direct index.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use memokit::policy::lfu::LfuCore;
///
/// let mut core = LfuCore::new(2).unwrap();
/// core.insert(1, Arc::new("a"));
/// core.insert(2, Arc::new("b"));
/// core.get(&1);            // count(1) = 2
/// core.insert(3, Arc::new("c"));
/// assert!(!core.contains(&2)); // 2 had the lowest count
/// assert!(core.contains(&1));
/// ```
pub struct LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    order: IntrusiveList<LfuEntry<K, V>>,
    capacity: usize,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU core; fails with `InvalidCapacity` if `capacity` is 0.
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

    /// Returns the value for `key`, incrementing its access count.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.bump(id);
        self.order.get(id).map(|entry| Arc::clone(&entry.value))
    }

    /// Returns the value for `key` without counting the access.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| Arc::clone(&entry.value))
    }

    /// Inserts or overwrites `key`, returning the previous value if any.
    ///
    /// Overwriting counts as an access. A brand-new key at full capacity
    /// first evicts the back of the ordering (the global minimum count).
    pub fn insert(&mut self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        if let Some(&id) = self.index.get(&key) {
            let old = {
                let entry = self.order.get_mut(id)?;
                std::mem::replace(&mut entry.value, value)
            };
            self.bump(id);
            return Some(old);
        }

        if self.index.len() >= self.capacity {
            let _ = self.pop_lfu();
        }

        let id = self.order.push_back(LfuEntry {
            key: key.clone(),
            value,
            count: 1,
        });
        self.index.insert(key, id);
        None
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let id = self.index.remove(key)?;
        self.order.remove(id).map(|entry| entry.value)
    }

    /// Removes and returns the least-frequently-used entry.
    pub fn pop_lfu(&mut self) -> Option<(K, Arc<V>)> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Returns the access count for `key`, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| entry.count)
    }

    /// Returns `true` if `key` is resident. Does not count as an access.
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

    /// Increments the count at `id` and restores the descending-count order
    /// by bubbling the entry past strictly lower-count predecessors.
    fn bump(&mut self, id: SlotId) {
        let count = match self.order.get_mut(id) {
            Some(entry) => {
                entry.count += 1;
                entry.count
            }
            None => return,
        };

        let mut anchor = None;
        let mut cursor = self.order.prev_id(id);
        while let Some(prev) = cursor {
            let prev_count = match self.order.get(prev) {
                Some(entry) => entry.count,
                None => break,
            };
            if prev_count >= count {
                break;
            }
            anchor = Some(prev);
            cursor = self.order.prev_id(prev);
        }

        if let Some(anchor) = anchor {
            self.order.move_before(id, anchor);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.order.len());
        assert!(self.order.len() <= self.capacity);

        // Counts must be non-increasing from front to back.
        let mut last = u64::MAX;
        for entry in self.order.iter() {
            assert!(
                entry.count <= last,
                "ordering violated: count {} follows {}",
                entry.count,
                last
            );
            last = entry.count;
        }

        for (key, &id) in &self.index {
            let entry = self.order.get(id).expect("indexed entry missing");
            assert!(entry.key == *key, "index handle points at wrong entry");
        }
        self.order.debug_validate_invariants();
    }
}

impl<K, V> std::fmt::Debug for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Thread-safe LFU cache implementing [`BoundedCache`].
///
/// # Example
///
/// ```
/// use memokit::policy::lfu::LfuCache;
/// use memokit::traits::BoundedCache;
///
/// let cache = LfuCache::new(3).unwrap();
/// cache.put(1, "one").unwrap();
/// cache.put(2, "two").unwrap();
/// cache.put(3, "three").unwrap();
/// cache.get(&1).unwrap();
/// cache.get(&1).unwrap();
/// cache.get(&2).unwrap();
/// cache.put(4, "four").unwrap();   // evicts 3: strictly lowest count
/// assert!(!cache.contains(&3));
/// assert!(cache.contains(&1) && cache.contains(&2) && cache.contains(&4));
/// ```
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache; fails with `InvalidCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(LfuCore::new(capacity)?),
        })
    }
}

impl<K, V> BoundedCache<K, V> for LfuCache<K, V>
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

impl<K, V> std::fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LfuCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
