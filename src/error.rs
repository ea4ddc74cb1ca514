//! Error types for the memokit library.
//!
//! All cache operations report failure synchronously through [`CacheError`];
//! there is no deferred or batched error reporting. The background sweep of
//! the actively-swept TTL cache never surfaces errors to callers.

use thiserror::Error;

/// Errors returned by cache construction and operations.
///
/// `NotFound`, `Expired`, and `CapacityExhausted` are recoverable: the caller
/// decides whether to retry, reinsert, or give up. `InvalidCapacity` is fatal
/// to construction.
///
/// # Example
///
/// ```
/// use memokit::error::CacheError;
/// use memokit::policy::lru::LruCache;
///
/// let err = LruCache::<u64, String>::new(0).unwrap_err();
/// assert_eq!(err, CacheError::InvalidCapacity);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Capacity was zero, or a TTL duration was zero.
    #[error("capacity and time-to-live parameters must be greater than zero")]
    InvalidCapacity,

    /// The key was not found in the cache.
    #[error("the key was not found in the cache")]
    NotFound,

    /// The key's time-to-live has elapsed. The entry is purged as a side
    /// effect of detecting this.
    #[error("the key has expired")]
    Expired,

    /// The cache is full and no entry could be reclaimed. Only the TTL
    /// policies return this from `put`; LRU, LFU, and ARC always admit by
    /// evicting.
    #[error("the cache is full and no entry could be reclaimed")]
    CapacityExhausted,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
