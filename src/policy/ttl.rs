//! Time-to-live expiration policies.
//!
//! Both variants share one expiry rule: an entry inserted at time `t` with
//! life-time `L` is expired once `now - t > L`. Expired entries are never
//! returned by `get`, but may transiently remain in the backing maps until a
//! sweep removes them. TTL is the only reclamation mechanism: `put` on a full
//! cache fails with `CapacityExhausted` instead of evicting live entries.
//!
//! - [`LazyTtlCache`] sweeps synchronously at the start of every `put` and
//!   rejects only if the map is still full afterwards.
//! - [`ActiveTtlCache`] owns a dedicated sweeper thread that takes the cache
//!   lock on a fixed interval (default 100 ms), removes everything expired,
//!   and releases the lock before sleeping. Its `put` does no sweeping on the
//!   caller's thread. Dropping the cache signals the sweeper through a
//!   condvar and joins it; shutdown latency is bounded by one sweep pass.
//!
//! Storage is a two-map shape: `key -> value` plus
//! `key -> insertion stamp`, both behind one exclusive lock so they always
//! move together.

use std::hash::Hash;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{CacheError, Result};
use crate::traits::BoundedCache;

/// Sweep interval used by [`ActiveTtlCache::new`].
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Backing storage shared by both TTL variants: value map + stamp map.
struct TtlState<K, V> {
    storage: FxHashMap<K, Arc<V>>,
    stamps: FxHashMap<K, Instant>,
}

impl<K, V> TtlState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            storage: FxHashMap::default(),
            stamps: FxHashMap::default(),
        }
    }

    fn is_expired(&self, key: &K, now: Instant, life_time: Duration) -> bool {
        match self.stamps.get(key) {
            Some(&stamp) => now.duration_since(stamp) > life_time,
            None => false,
        }
    }

    fn purge(&mut self, key: &K) {
        self.storage.remove(key);
        self.stamps.remove(key);
    }

    /// Removes every currently-expired entry; returns how many were removed.
    fn sweep(&mut self, life_time: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<K> = self
            .stamps
            .iter()
            .filter(|(_, &stamp)| now.duration_since(stamp) > life_time)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.purge(key);
        }
        expired.len()
    }

    fn clear(&mut self) {
        self.storage.clear();
        self.stamps.clear();
    }
}

fn validate(capacity: usize, durations: &[Duration]) -> Result<()> {
    if capacity == 0 || durations.iter().any(|d| d.is_zero()) {
        return Err(CacheError::InvalidCapacity);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lazy variant
// ---------------------------------------------------------------------------

/// TTL cache that reclaims expired entries on the caller's thread.
///
/// Every `put` begins with a full sweep; if the map is still at capacity the
/// insert fails with `CapacityExhausted`. `get` checks the requested key's
/// own expiry at call time and purges it on lapse, so expired values are
/// never observable between sweeps.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use memokit::policy::ttl::LazyTtlCache;
/// use memokit::traits::BoundedCache;
/// use memokit::error::CacheError;
///
/// let cache = LazyTtlCache::new(1, Duration::from_secs(60)).unwrap();
/// cache.put(1, "one").unwrap();
/// // Full, and nothing has expired yet: no room can be reclaimed.
/// assert_eq!(cache.put(2, "two").unwrap_err(), CacheError::CapacityExhausted);
/// ```
pub struct LazyTtlCache<K, V> {
    state: Mutex<TtlState<K, V>>,
    capacity: usize,
    life_time: Duration,
}

impl<K, V> LazyTtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a lazy TTL cache; fails with `InvalidCapacity` if `capacity`
    /// is 0 or `life_time` is zero.
    pub fn new(capacity: usize, life_time: Duration) -> Result<Self> {
        validate(capacity, &[life_time])?;
        Ok(Self {
            state: Mutex::new(TtlState::new()),
            capacity,
            life_time,
        })
    }

    /// Returns the configured life-time.
    pub fn life_time(&self) -> Duration {
        self.life_time
    }
}

impl<K, V> BoundedCache<K, V> for LazyTtlCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<Arc<V>> {
        let mut state = self.state.lock();
        let now = Instant::now();
        match state.storage.get(key) {
            None => Err(CacheError::NotFound),
            Some(_) if state.is_expired(key, now, self.life_time) => {
                state.purge(key);
                Err(CacheError::Expired)
            }
            Some(value) => Ok(Arc::clone(value)),
        }
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        let mut state = self.state.lock();
        state.sweep(self.life_time);

        if state.storage.contains_key(&key) {
            // Overwrite occupies no new slot; refresh value and stamp.
            state.stamps.insert(key.clone(), Instant::now());
            state.storage.insert(key, Arc::new(value));
            return Ok(());
        }
        if state.storage.len() >= self.capacity {
            return Err(CacheError::CapacityExhausted);
        }
        state.stamps.insert(key.clone(), Instant::now());
        state.storage.insert(key, Arc::new(value));
        Ok(())
    }

    fn contains(&self, key: &K) -> bool {
        let state = self.state.lock();
        state.storage.contains_key(key) && !state.is_expired(key, Instant::now(), self.life_time)
    }

    fn erase(&self, key: &K) -> Result<()> {
        let mut state = self.state.lock();
        if !state.storage.contains_key(key) {
            return Err(CacheError::NotFound);
        }
        let expired = state.is_expired(key, Instant::now(), self.life_time);
        state.purge(key);
        if expired {
            // An expired entry is logically absent; purging it is incidental.
            return Err(CacheError::NotFound);
        }
        Ok(())
    }

    fn clear(&self) {
        self.state.lock().clear();
    }

    fn len(&self) -> usize {
        self.state.lock().storage.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> std::fmt::Debug for LazyTtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyTtlCache")
            .field("len", &self.state.lock().storage.len())
            .field("capacity", &self.capacity)
            .field("life_time", &self.life_time)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Actively-swept variant
// ---------------------------------------------------------------------------

struct ActiveState<K, V> {
    entries: TtlState<K, V>,
    shutdown: bool,
}

struct ActiveShared<K, V> {
    state: Mutex<ActiveState<K, V>>,
    wakeup: Condvar,
}

/// TTL cache with a dedicated background sweeper thread.
///
/// The sweeper and callers contend on the same mutex; one sweep pass holds it
/// at most once per wake, so callers are never blocked longer than a single
/// pass. `put` never sweeps and fails with `CapacityExhausted` when the map
/// is full at call time. `get` still double-checks the key's expiry, covering
/// the window between sweeps.
///
/// Dropping the cache performs a graceful shutdown: the shutdown flag is set
/// under the lock, the sweeper's condvar is notified, and the thread is
/// joined before the drop returns.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use memokit::policy::ttl::ActiveTtlCache;
/// use memokit::traits::BoundedCache;
///
/// let cache = ActiveTtlCache::new(16, Duration::from_secs(60)).unwrap();
/// cache.put(1, "one").unwrap();
/// assert_eq!(*cache.get(&1).unwrap(), "one");
/// ```
pub struct ActiveTtlCache<K, V> {
    shared: Arc<ActiveShared<K, V>>,
    capacity: usize,
    life_time: Duration,
    sweep_interval: Duration,
    sweeper: Option<JoinHandle<()>>,
}

impl<K, V> ActiveTtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    /// Creates an actively-swept TTL cache with the default 100 ms sweep
    /// interval.
    pub fn new(capacity: usize, life_time: Duration) -> Result<Self> {
        Self::with_sweep_interval(capacity, life_time, DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates an actively-swept TTL cache with an explicit sweep interval.
    ///
    /// Fails with `InvalidCapacity` if `capacity` is 0 or either duration is
    /// zero.
    pub fn with_sweep_interval(
        capacity: usize,
        life_time: Duration,
        sweep_interval: Duration,
    ) -> Result<Self> {
        validate(capacity, &[life_time, sweep_interval])?;

        let shared = Arc::new(ActiveShared {
            state: Mutex::new(ActiveState {
                entries: TtlState::new(),
                shutdown: false,
            }),
            wakeup: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let sweeper = std::thread::Builder::new()
            .name("memokit-ttl-sweeper".to_string())
            .spawn(move || {
                debug!(
                    interval_ms = sweep_interval.as_millis() as u64,
                    "TTL sweeper started"
                );
                let mut state = worker_shared.state.lock();
                loop {
                    if state.shutdown {
                        break;
                    }
                    let removed = state.entries.sweep(life_time);
                    if removed > 0 {
                        trace!(removed, "swept expired entries");
                    }
                    // Releases the lock while sleeping; a shutdown notify or
                    // the interval elapsing wakes the loop.
                    worker_shared
                        .wakeup
                        .wait_for(&mut state, sweep_interval);
                }
                debug!("TTL sweeper stopped");
            })
            .expect("failed to spawn TTL sweeper thread");

        Ok(Self {
            shared,
            capacity,
            life_time,
            sweep_interval,
            sweeper: Some(sweeper),
        })
    }

    /// Returns the configured life-time.
    pub fn life_time(&self) -> Duration {
        self.life_time
    }

    /// Returns the configured sweep interval.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

impl<K, V> BoundedCache<K, V> for ActiveTtlCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<Arc<V>> {
        let mut state = self.shared.state.lock();
        let now = Instant::now();
        match state.entries.storage.get(key) {
            None => Err(CacheError::NotFound),
            Some(_) if state.entries.is_expired(key, now, self.life_time) => {
                // Raced ahead of the sweeper; purge here.
                state.entries.purge(key);
                Err(CacheError::Expired)
            }
            Some(value) => Ok(Arc::clone(value)),
        }
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        let mut state = self.shared.state.lock();

        if state.entries.storage.contains_key(&key) {
            state.entries.stamps.insert(key.clone(), Instant::now());
            state.entries.storage.insert(key, Arc::new(value));
            return Ok(());
        }
        // No reclamation on the caller's thread; the sweeper makes room.
        if state.entries.storage.len() >= self.capacity {
            return Err(CacheError::CapacityExhausted);
        }
        state.entries.stamps.insert(key.clone(), Instant::now());
        state.entries.storage.insert(key, Arc::new(value));
        Ok(())
    }

    fn contains(&self, key: &K) -> bool {
        let state = self.shared.state.lock();
        state.entries.storage.contains_key(key)
            && !state.entries.is_expired(key, Instant::now(), self.life_time)
    }

    fn erase(&self, key: &K) -> Result<()> {
        let mut state = self.shared.state.lock();
        if !state.entries.storage.contains_key(key) {
            return Err(CacheError::NotFound);
        }
        let expired = state.entries.is_expired(key, Instant::now(), self.life_time);
        state.entries.purge(key);
        if expired {
            return Err(CacheError::NotFound);
        }
        Ok(())
    }

    fn clear(&self) {
        self.shared.state.lock().entries.clear();
    }

    fn len(&self) -> usize {
        self.shared.state.lock().entries.storage.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> Drop for ActiveTtlCache<K, V> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.wakeup.notify_one();
        if let Some(handle) = self.sweeper.take() {
            let _ = handle.join();
        }
    }
}

impl<K, V> std::fmt::Debug for ActiveTtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveTtlCache")
            .field("len", &self.shared.state.lock().entries.storage.len())
            .field("capacity", &self.capacity)
            .field("life_time", &self.life_time)
            .field("sweep_interval", &self.sweep_interval)
            .finish_non_exhaustive()
    }
}
