//! Cache Module
//!
//! Provides a memory-bounded in-process cache with TTL expiration and LRU
//! eviction.

mod entry;
mod lru;
mod lru_cache;
mod pool;
mod size;
mod stats;
mod store;
mod sweeper;
mod weight;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use entry::{CacheEntry, Expiry};
pub use lru::RecencyList;
pub use lru_cache::LruCache;
pub use pool::{EntryId, EntryPool};
pub use size::{check_memory_bounds, parse_memory_size};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use sweeper::{should_sweep, SweepControl, SweepGuard};
pub use weight::{FixedWeigher, Weigher};

// == Public Constants ==
pub const UNIT_KB: usize = 1 << 10;
pub const UNIT_MB: usize = 1 << 20;
pub const UNIT_GB: usize = 1 << 30;

/// Smallest accepted memory budget
pub const MIN_MEMORY: usize = UNIT_KB;
/// Largest accepted memory budget
pub const MAX_MEMORY: usize = 4 * UNIT_GB;
pub const DEFAULT_MAX_MEMORY: usize = 100 * UNIT_MB;

/// Default interval between proactive sweeps
pub const DEFAULT_GC_PERIOD: Duration = Duration::from_secs(120);
/// Minimum time between two sweeps, whatever the trigger
pub const MIN_GC_PERIOD: Duration = Duration::from_secs(1);
/// How often the background task attempts a sweep
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Cost charged for every entry by [`FixedWeigher::default`]
pub const DEFAULT_ENTRY_WEIGHT: usize = 32;
