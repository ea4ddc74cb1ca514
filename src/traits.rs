//! The cache contract shared by every eviction policy.
//!
//! All five cache types expose the same operation set through
//! [`BoundedCache`]; a caller picks a policy at construction and interacts
//! only through this trait (or through the [`crate::builder::PolicyCache`]
//! sum type, which dispatches to it).
//!
//! ## Operation summary
//!
//! | Operation  | Promotes? | Failure modes                        |
//! |------------|-----------|--------------------------------------|
//! | `get`      | yes       | `NotFound`, `Expired` (TTL only)     |
//! | `put`      | yes       | `CapacityExhausted` (TTL only)       |
//! | `contains` | no        | —                                    |
//! | `erase`    | —         | `NotFound`                           |
//! | `clear`    | —         | —                                    |
//! | `len`      | no        | —                                    |
//!
//! ## Locking
//!
//! Every operation, including `contains` and `len`, takes the cache's single
//! exclusive lock for its duration: the ordering structure and the lookup
//! index must move together atomically, so operations are not decomposable
//! into smaller critical sections.
//!
//! ## Ownership
//!
//! The cache exclusively owns its entries. `get` returns a clone of the
//! internally held `Arc<V>`, never a reference into locked state, so the
//! returned handle stays valid across later mutations of the cache.

use std::sync::Arc;

use crate::error::Result;

/// Capability set implemented by every eviction policy.
///
/// # Type Parameters
///
/// - `K`: key type; implementations require `Eq + Hash + Clone`
/// - `V`: value type, owned by the cache and handed out as `Arc<V>`
///
/// # Example
///
/// ```
/// use memokit::prelude::*;
///
/// fn warm<C: BoundedCache<u64, String>>(cache: &C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.put(*key, value.to_string()).unwrap();
///     }
/// }
///
/// let cache = LruCache::new(16).unwrap();
/// warm(&cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(cache.len(), 2);
/// assert_eq!(*cache.get(&1).unwrap(), "one");
/// ```
pub trait BoundedCache<K, V>: Send + Sync {
    /// Returns the value for `key`, promoting it per the policy.
    ///
    /// TTL caches additionally purge and report [`CacheError::Expired`]
    /// entries whose lifetime has elapsed, even if no sweep has run yet.
    ///
    /// [`CacheError::Expired`]: crate::error::CacheError::Expired
    fn get(&self, key: &K) -> Result<Arc<V>>;

    /// Inserts or overwrites `key`.
    ///
    /// Inserting a brand-new key at full capacity first runs the policy's
    /// eviction/admission step. The TTL policies have no secondary eviction
    /// mechanism and instead fail with [`CacheError::CapacityExhausted`];
    /// LRU, LFU, and ARC always admit.
    ///
    /// [`CacheError::CapacityExhausted`]: crate::error::CacheError::CapacityExhausted
    fn put(&self, key: K, value: V) -> Result<()>;

    /// Returns `true` if `key` is resident, without promoting it.
    fn contains(&self, key: &K) -> bool;

    /// Removes the entry for `key`; fails with [`CacheError::NotFound`] if
    /// absent.
    ///
    /// [`CacheError::NotFound`]: crate::error::CacheError::NotFound
    fn erase(&self, key: &K) -> Result<()>;

    /// Removes all entries.
    fn clear(&self);

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    fn capacity(&self) -> usize;
}
