//! Policy selection at runtime.
//!
//! [`CacheBuilder`] constructs any of the cache flavors behind the single
//! [`PolicyCache`] enum, so callers can pick a policy from configuration
//! without threading generics through their own code:
//!
//! ```
//! use memokit::builder::{CacheBuilder, CachePolicy};
//! use memokit::traits::BoundedCache;
//!
//! let cache = CacheBuilder::new(128)
//!     .build::<String, Vec<u8>>(CachePolicy::Arc)
//!     .unwrap();
//! cache.put("session".into(), vec![1, 2, 3]).unwrap();
//! assert_eq!(cache.capacity(), 128);
//! ```
//!
//! Static dispatch via the concrete types (`LruCache`, `ArcCache`, ...) stays
//! available for callers that know their policy at compile time.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::policy::{ActiveTtlCache, ArcCache, LazyTtlCache, LfuCache, LruCache};
use crate::traits::BoundedCache;

/// Eviction policy selector for [`CacheBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Evict the least recently used entry.
    Lru,
    /// Evict the least frequently used entry.
    Lfu,
    /// Expire entries after `life_time`, reclaiming lazily on access.
    LazyTtl { life_time: Duration },
    /// Expire entries after `life_time`, swept by a background thread.
    ActiveTtl {
        life_time: Duration,
        sweep_interval: Option<Duration>,
    },
    /// Adaptive replacement balancing recency and frequency.
    Arc,
}

/// Builder for policy-selected caches.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds the cache for `policy`.
    ///
    /// Fails with [`CacheError::InvalidCapacity`](crate::error::CacheError)
    /// when the capacity or a TTL parameter is zero.
    pub fn build<K, V>(self, policy: CachePolicy) -> Result<PolicyCache<K, V>>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Send + Sync + 'static,
    {
        let cache = match policy {
            CachePolicy::Lru => PolicyCache::Lru(LruCache::new(self.capacity)?),
            CachePolicy::Lfu => PolicyCache::Lfu(LfuCache::new(self.capacity)?),
            CachePolicy::LazyTtl { life_time } => {
                PolicyCache::LazyTtl(LazyTtlCache::new(self.capacity, life_time)?)
            }
            CachePolicy::ActiveTtl {
                life_time,
                sweep_interval,
            } => {
                let cache = match sweep_interval {
                    Some(interval) => {
                        ActiveTtlCache::with_sweep_interval(self.capacity, life_time, interval)?
                    }
                    None => ActiveTtlCache::new(self.capacity, life_time)?,
                };
                PolicyCache::ActiveTtl(cache)
            }
            CachePolicy::Arc => PolicyCache::Arc(ArcCache::new(self.capacity)?),
        };
        Ok(cache)
    }
}

/// A cache of any policy, built by [`CacheBuilder`].
///
/// Delegates every [`BoundedCache`] operation to the wrapped cache.
pub enum PolicyCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    LazyTtl(LazyTtlCache<K, V>),
    ActiveTtl(ActiveTtlCache<K, V>),
    Arc(ArcCache<K, V>),
}

macro_rules! delegate {
    ($self:ident, $cache:ident => $body:expr) => {
        match $self {
            PolicyCache::Lru($cache) => $body,
            PolicyCache::Lfu($cache) => $body,
            PolicyCache::LazyTtl($cache) => $body,
            PolicyCache::ActiveTtl($cache) => $body,
            PolicyCache::Arc($cache) => $body,
        }
    };
}

impl<K, V> BoundedCache<K, V> for PolicyCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Result<Arc<V>> {
        delegate!(self, cache => cache.get(key))
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        delegate!(self, cache => cache.put(key, value))
    }

    fn contains(&self, key: &K) -> bool {
        delegate!(self, cache => cache.contains(key))
    }

    fn erase(&self, key: &K) -> Result<()> {
        delegate!(self, cache => cache.erase(key))
    }

    fn clear(&self) {
        delegate!(self, cache => cache.clear())
    }

    fn len(&self) -> usize {
        delegate!(self, cache => cache.len())
    }

    fn capacity(&self) -> usize {
        delegate!(self, cache => cache.capacity())
    }
}

impl<K, V> std::fmt::Debug for PolicyCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PolicyCache::Lru(_) => "Lru",
            PolicyCache::Lfu(_) => "Lfu",
            PolicyCache::LazyTtl(_) => "LazyTtl",
            PolicyCache::ActiveTtl(_) => "ActiveTtl",
            PolicyCache::Arc(_) => "Arc",
        };
        f.debug_struct("PolicyCache")
            .field("policy", &name)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
