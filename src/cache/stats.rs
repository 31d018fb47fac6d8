//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, evictions, expirations and sweeps.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache activity counters and current occupancy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful retrievals
    pub hits: u64,
    /// Number of failed retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to stay within the memory budget
    pub evictions: u64,
    /// Number of expired entries removed, lazily or by a sweep
    pub expirations: u64,
    /// Number of sweeps that actually ran
    pub sweeps: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current total weight of resident entries
    pub memory_used: usize,
    /// Configured memory budget
    pub max_memory: usize,
    /// Wall-clock time of the last completed sweep
    pub last_sweep: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups were made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expirations ==
    /// Adds `count` reclaimed expired entries.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Record Sweep ==
    /// Counts a completed sweep and stamps its wall-clock time.
    pub fn record_sweep(&mut self, at: DateTime<Utc>) {
        self.sweeps += 1;
        self.last_sweep = Some(at);
    }

    // == Update Occupancy ==
    /// Updates the entry count, memory in use and budget.
    pub fn set_occupancy(&mut self, entries: usize, memory_used: usize, max_memory: usize) {
        self.total_entries = entries;
        self.memory_used = memory_used;
        self.max_memory = max_memory;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.sweeps, 0);
        assert!(stats.last_sweep.is_none());
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_sweep() {
        let mut stats = CacheStats::new();
        let at = Utc::now();
        stats.record_sweep(at);
        stats.record_expirations(5);

        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.expirations, 5);
        assert_eq!(stats.last_sweep, Some(at));
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.set_occupancy(3, 96, 1024);
        stats.record_eviction();

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_entries"], 3);
        assert_eq!(json["memory_used"], 96);
        assert_eq!(json["max_memory"], 1024);
        assert_eq!(json["evictions"], 1);
        assert!(json["last_sweep"].is_null());
    }
}
