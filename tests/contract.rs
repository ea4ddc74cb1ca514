// ==============================================
// CROSS-POLICY CONTRACT TESTS (integration)
// ==============================================
//
// Every cache flavor is exercised through the BoundedCache trait with the
// same scenarios, so behavior that must be uniform across policies is
// checked in one place rather than per-module.

use std::sync::Arc;
use std::time::Duration;

use memokit::builder::{CacheBuilder, CachePolicy};
use memokit::error::CacheError;
use memokit::traits::BoundedCache;

// Long enough that no entry expires while a test body runs.
const LONG_LIFE: Duration = Duration::from_secs(60);

fn all_policies() -> Vec<CachePolicy> {
    vec![
        CachePolicy::Lru,
        CachePolicy::Lfu,
        CachePolicy::LazyTtl {
            life_time: LONG_LIFE,
        },
        CachePolicy::ActiveTtl {
            life_time: LONG_LIFE,
            sweep_interval: None,
        },
        CachePolicy::Arc,
    ]
}

fn build(policy: CachePolicy, capacity: usize) -> impl BoundedCache<u32, String> {
    CacheBuilder::new(capacity)
        .build::<u32, String>(policy)
        .unwrap()
}

// ==============================================
// Basic round trip
// ==============================================

mod round_trip {
    use super::*;

    #[test]
    fn put_then_get_returns_the_value() {
        for policy in all_policies() {
            let cache = build(policy, 8);
            cache.put(1, "one".into()).unwrap();
            assert_eq!(*cache.get(&1).unwrap(), "one", "policy {policy:?}");
            assert!(cache.contains(&1), "policy {policy:?}");
            assert_eq!(cache.len(), 1, "policy {policy:?}");
        }
    }

    #[test]
    fn get_of_missing_key_is_not_found() {
        for policy in all_policies() {
            let cache = build(policy, 8);
            assert_eq!(
                cache.get(&42).unwrap_err(),
                CacheError::NotFound,
                "policy {policy:?}"
            );
            assert!(!cache.contains(&42), "policy {policy:?}");
        }
    }

    #[test]
    fn overwrite_replaces_the_value_without_growing() {
        for policy in all_policies() {
            let cache = build(policy, 8);
            cache.put(1, "old".into()).unwrap();
            cache.put(1, "new".into()).unwrap();
            assert_eq!(*cache.get(&1).unwrap(), "new", "policy {policy:?}");
            assert_eq!(cache.len(), 1, "policy {policy:?}");
        }
    }
}

// ==============================================
// Capacity invariant
// ==============================================

mod capacity {
    use super::*;

    #[test]
    fn len_never_exceeds_capacity_under_churn() {
        for policy in all_policies() {
            let cache = build(policy, 4);
            for i in 0..100 {
                // TTL caches reject new keys when full instead of evicting.
                let _ = cache.put(i % 17, format!("v{i}"));
                assert!(cache.len() <= cache.capacity(), "policy {policy:?}");
            }
        }
    }

    #[test]
    fn capacity_reports_the_configured_bound() {
        for policy in all_policies() {
            let cache = build(policy, 11);
            assert_eq!(cache.capacity(), 11, "policy {policy:?}");
        }
    }

    #[test]
    fn zero_capacity_is_rejected_at_build() {
        for policy in all_policies() {
            assert_eq!(
                CacheBuilder::new(0)
                    .build::<u32, String>(policy)
                    .map(|_| ())
                    .unwrap_err(),
                CacheError::InvalidCapacity,
                "policy {policy:?}"
            );
        }
    }
}

// ==============================================
// Erase and clear
// ==============================================

mod erase_and_clear {
    use super::*;

    #[test]
    fn erase_removes_exactly_the_named_key() {
        for policy in all_policies() {
            let cache = build(policy, 8);
            cache.put(1, "one".into()).unwrap();
            cache.put(2, "two".into()).unwrap();

            cache.erase(&1).unwrap();
            assert!(!cache.contains(&1), "policy {policy:?}");
            assert!(cache.contains(&2), "policy {policy:?}");
        }
    }

    #[test]
    fn erase_of_missing_key_is_not_found() {
        for policy in all_policies() {
            let cache = build(policy, 8);
            assert_eq!(
                cache.erase(&99).unwrap_err(),
                CacheError::NotFound,
                "policy {policy:?}"
            );
        }
    }

    #[test]
    fn clear_empties_and_is_idempotent() {
        for policy in all_policies() {
            let cache = build(policy, 8);
            for i in 0..5 {
                cache.put(i, format!("v{i}")).unwrap();
            }
            cache.clear();
            assert!(cache.is_empty(), "policy {policy:?}");
            cache.clear();
            assert!(cache.is_empty(), "policy {policy:?}");

            // The cache stays usable after clearing.
            cache.put(1, "back".into()).unwrap();
            assert_eq!(*cache.get(&1).unwrap(), "back", "policy {policy:?}");
        }
    }
}

// ==============================================
// Shared handles survive eviction
// ==============================================

mod value_handles {
    use super::*;

    #[test]
    fn returned_arc_outlives_eviction() {
        let cache = build(CachePolicy::Lru, 2);
        cache.put(1, "keep".into()).unwrap();
        let held = cache.get(&1).unwrap();

        cache.put(2, "b".into()).unwrap();
        cache.put(3, "c".into()).unwrap(); // evicts key 1

        assert!(!cache.contains(&1));
        assert_eq!(*held, "keep");
    }
}

// ==============================================
// Concurrent access through the trait
// ==============================================

mod concurrency {
    use super::*;

    #[test]
    fn parallel_writers_and_readers_stay_bounded() {
        for policy in [CachePolicy::Lru, CachePolicy::Lfu, CachePolicy::Arc] {
            let cache = Arc::new(build(policy, 32));
            let mut handles = Vec::new();
            for t in 0..4u32 {
                let cache = Arc::clone(&cache);
                handles.push(std::thread::spawn(move || {
                    for i in 0..250u32 {
                        let key = t * 1000 + (i % 50);
                        cache.put(key, format!("{t}:{i}")).unwrap();
                        let _ = cache.get(&key);
                        if i % 7 == 0 {
                            let _ = cache.erase(&key);
                        }
                    }
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }
            assert!(cache.len() <= cache.capacity(), "policy {policy:?}");
        }
    }
}
