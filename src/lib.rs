//! memokit: bounded in-memory key-value caches.
//!
//! Five cache types share one contract ([`traits::BoundedCache`]) and differ
//! only in how they reclaim room: least-recently-used, least-frequently-used,
//! time-to-live (lazy and actively-swept), and adaptive replacement (ARC).
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;
