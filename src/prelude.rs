//! Convenience re-exports of the crate's public surface.

pub use crate::builder::{CacheBuilder, CachePolicy, PolicyCache};
pub use crate::ds::{GhostList, IntrusiveList, SlotArena, SlotId};
pub use crate::error::{CacheError, Result};
pub use crate::policy::arc::{ArcCache, ArcCore};
pub use crate::policy::lfu::{LfuCache, LfuCore};
pub use crate::policy::lru::{LruCache, LruCore};
pub use crate::policy::ttl::{ActiveTtlCache, LazyTtlCache, DEFAULT_SWEEP_INTERVAL};
pub use crate::traits::BoundedCache;
