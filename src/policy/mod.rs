//! Eviction policy implementations.
//!
//! Each module pairs a single-threaded `*Core` (ordering + index, `&mut self`
//! operations) with a locked `*Cache` wrapper implementing
//! [`crate::traits::BoundedCache`]. The policies are independent; none
//! layers on another.

pub mod arc;
pub mod lfu;
pub mod lru;
pub mod ttl;

pub use arc::{ArcCache, ArcCore};
pub use lfu::{LfuCache, LfuCore};
pub use lru::{LruCache, LruCore};
pub use ttl::{ActiveTtlCache, LazyTtlCache};
