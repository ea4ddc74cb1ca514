//! Bounded recency list of evicted keys.
//!
//! ARC remembers keys it has evicted (without their values) so that a repeat
//! miss on such a key can be told apart from a cold miss. A `GhostList` is an
//! [`IntrusiveList`] of keys plus a direct index; recording at capacity drops
//! the oldest ghost silently.
//!
//! - `record(k)`: insert at MRU (or refresh position), evicting the LRU ghost
//!   if the list is full
//! - `remove(k)`: delete from list and index
//! - `drop_oldest()`: pop the LRU ghost explicitly
//!
//! All operations are O(1) average. `debug_validate_invariants()` is
//! available in debug/test builds.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;

/// Bounded key-only recency list for ARC-style ghost tracking.
#[derive(Debug)]
pub struct GhostList<K> {
    list: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::default(),
            capacity,
        }
    }

    /// Returns the number of ghost keys tracked.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no ghosts are tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is a tracked ghost.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as the most recent ghost, dropping the oldest ghost if
    /// the list is at capacity.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return;
        }

        if self.list.len() >= self.capacity {
            let _ = self.drop_oldest();
        }

        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key`; returns `true` if it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                let _ = self.list.remove(id);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the least recent ghost.
    pub fn drop_oldest(&mut self) -> Option<K> {
        let key = self.list.pop_back()?;
        self.index.remove(&key);
        Some(key)
    }

    /// Clears all tracked keys.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for &id in self.index.values() {
            assert!(self.list.contains(id));
        }
    }
}
