//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the accounting, recency and expiration invariants
//! of the store against arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::TimeDelta;

use crate::cache::{CacheStore, DEFAULT_ENTRY_WEIGHT, UNIT_KB};

// == Strategies ==
/// Small key space so sequences hit existing keys often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e][0-9]{1,2}".prop_map(|s| s)
}

fn ttl_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), 1i64..5, Just(-1i64)]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32, ttl: i64 },
    Get { key: String },
    Exists { key: String },
    Delete { key: String },
    Advance { millis: u64 },
    Sweep,
    Flush,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), any::<u32>(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Set { key, value, ttl }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Exists { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        2 => (100u64..3000).prop_map(|millis| CacheOp::Advance { millis }),
        1 => Just(CacheOp::Sweep),
        1 => Just(CacheOp::Flush),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of operations, after each one: entry count matches the
    // index and the list, total weight matches the sum of entry weights, the
    // budget holds, and the chain is consistent.
    #[test]
    fn prop_invariants_hold_after_every_operation(
        ops in prop::collection::vec(cache_op_strategy(), 1..150)
    ) {
        // 1KB fits 32 entries, small enough to force evictions
        let mut store: CacheStore<u32> = CacheStore::new(UNIT_KB).unwrap();
        store.set_gc_period(Duration::from_secs(2));
        let mut now = Instant::now();

        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl } => {
                    let before = store.keys();
                    let result = store.set_at(key, value, TimeDelta::seconds(ttl), now);
                    if ttl < 0 {
                        prop_assert!(result.is_err());
                        prop_assert_eq!(store.keys(), before);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
                CacheOp::Get { key } => {
                    let _ = store.get_at(&key, now);
                }
                CacheOp::Exists { key } => {
                    let _ = store.exists_at(&key, now);
                }
                CacheOp::Delete { key } => {
                    let _ = store.del(&key);
                }
                CacheOp::Advance { millis } => {
                    now += Duration::from_millis(millis);
                }
                CacheOp::Sweep => {
                    let _ = store.try_sweep_at(now);
                }
                CacheOp::Flush => {
                    prop_assert!(store.flush());
                    prop_assert_eq!(store.keys(), 0);
                    prop_assert_eq!(store.memory_used(), 0);
                }
            }
            store.validate();
            prop_assert!(!store.control().in_progress());
        }
    }

    // Setting the same key twice keeps a single entry and the second value wins.
    #[test]
    fn prop_overwrite_semantics(key in key_strategy(), value1: u32, value2: u32) {
        let mut store: CacheStore<u32> = CacheStore::new(UNIT_KB).unwrap();
        store.set(key.clone(), value1, TimeDelta::zero()).unwrap();
        store.set(key.clone(), value2, TimeDelta::zero()).unwrap();

        prop_assert_eq!(store.keys(), 1);
        prop_assert_eq!(store.get(&key), Some(&value2));
    }

    // With room for N entries, inserting N + k distinct keys leaves exactly the
    // N most recent ones, in recency order.
    #[test]
    fn prop_lru_keeps_most_recent(extra in 1usize..100) {
        let capacity = UNIT_KB / DEFAULT_ENTRY_WEIGHT;
        let mut store: CacheStore<usize> = CacheStore::new(UNIT_KB).unwrap();

        for i in 0..capacity + extra {
            store.set(format!("k{}", i), i, TimeDelta::zero()).unwrap();
        }

        let expected: Vec<String> = (extra..capacity + extra)
            .rev()
            .map(|i| format!("k{}", i))
            .collect();
        prop_assert_eq!(store.keys(), capacity);
        prop_assert_eq!(store.recency_keys(), expected);
        prop_assert_eq!(store.stats().evictions, extra as u64);
    }

    // Evictions follow access order: a model deque of keys ordered by last
    // access predicts exactly which keys stay resident.
    #[test]
    fn prop_eviction_follows_access_order(
        accesses in prop::collection::vec((0usize..48, any::<bool>()), 1..300)
    ) {
        let capacity = UNIT_KB / DEFAULT_ENTRY_WEIGHT;
        let mut store: CacheStore<usize> = CacheStore::new(UNIT_KB).unwrap();
        let mut model: VecDeque<usize> = VecDeque::new();

        for (k, is_write) in accesses {
            let key = format!("k{}", k);
            let resident = model.contains(&k);
            if is_write {
                store.set(key, k, TimeDelta::zero()).unwrap();
                model.retain(|&m| m != k);
                model.push_front(k);
                model.truncate(capacity);
            } else {
                let found = store.get(&key).is_some();
                prop_assert_eq!(found, resident);
                if resident {
                    model.retain(|&m| m != k);
                    model.push_front(k);
                }
            }
        }

        let expected: Vec<String> = model.iter().map(|k| format!("k{}", k)).collect();
        prop_assert_eq!(store.recency_keys(), expected);
    }
}

// Expiration checks use a simulated clock, so they run fast
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Get/Exists/Del on an expired entry behave as if it were absent and drop
    // the entry count by exactly one.
    #[test]
    fn prop_expired_entry_is_reclaimed_on_access(
        key in key_strategy(),
        ttl in 1i64..10,
        probe in 0u8..3
    ) {
        let mut store: CacheStore<u32> = CacheStore::new(UNIT_KB).unwrap();
        let now = Instant::now();
        store.set_at(key.clone(), 7, TimeDelta::seconds(ttl), now).unwrap();
        store.set_at("zz".to_string(), 8, TimeDelta::zero(), now).unwrap();
        let later = now + Duration::from_secs(ttl as u64);

        match probe {
            0 => prop_assert_eq!(store.get_at(&key, later), None),
            1 => prop_assert!(!store.exists_at(&key, later)),
            _ => prop_assert!(store.del(&key)),
        }
        prop_assert_eq!(store.keys(), 1);
        prop_assert_eq!(store.memory_used(), DEFAULT_ENTRY_WEIGHT);
        store.validate();
    }

    // A sweep removes exactly the entries whose expiry has passed.
    #[test]
    fn prop_sweep_removes_exactly_expired(
        ttls in prop::collection::vec(0i64..6, 1..30),
        elapsed in 2u64..8
    ) {
        let mut store: CacheStore<usize> = CacheStore::new(UNIT_KB).unwrap();
        store.set_gc_period(Duration::from_secs(1));
        let start = store.last_sweep_at();

        for (i, ttl) in ttls.iter().enumerate() {
            store.set_at(format!("k{}", i), i, TimeDelta::seconds(*ttl), start).unwrap();
        }
        let later = start + Duration::from_secs(elapsed);
        let expected_removed = ttls
            .iter()
            .filter(|&&ttl| ttl > 0 && ttl as u64 <= elapsed)
            .count();

        prop_assert_eq!(store.try_sweep_at(later), Some(expected_removed));
        prop_assert_eq!(store.keys(), ttls.len() - expected_removed);
        prop_assert_eq!(store.last_sweep_at(), later);
        store.validate();
    }
}
