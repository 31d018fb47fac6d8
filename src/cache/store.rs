//! Cache Store Module
//!
//! Main cache engine: recency list + index, weight accounting, LRU eviction
//! and TTL expiration. Not synchronised; [`crate::cache::LruCache`] wraps it
//! in the single engine lock.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeDelta, Utc};
use tracing::{debug, info, trace, warn};

use crate::cache::size::{check_memory_bounds, parse_memory_size};
use crate::cache::sweeper::should_sweep;
use crate::cache::{
    CacheEntry, CacheStats, EntryId, Expiry, FixedWeigher, RecencyList, SweepControl, Weigher,
    DEFAULT_GC_PERIOD,
};
use crate::error::Result;

// == Cache Store ==
/// Memory-bounded store with LRU eviction and TTL support.
pub struct CacheStore<V> {
    /// Resident entries in recency order, with the key index
    list: RecencyList<V>,
    /// Number of resident entries
    elem_count: usize,
    /// Sum of the weights of resident entries
    elem_size: usize,
    /// Memory budget in bytes
    max_memory: usize,
    weigher: Box<dyn Weigher<V>>,
    control: Arc<SweepControl>,
    /// Instant the last active sweep ran
    last_sweep_at: Instant,
    stats: CacheStats,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a store with the default fixed per-entry weight.
    ///
    /// # Arguments
    /// * `max_memory` - Budget in bytes, within `[MIN_MEMORY, MAX_MEMORY]`
    pub fn new(max_memory: usize) -> Result<Self> {
        Self::with_weigher(max_memory, FixedWeigher::default())
    }

    /// Creates a store charging entries with a custom cost function.
    pub fn with_weigher(max_memory: usize, weigher: impl Weigher<V> + 'static) -> Result<Self> {
        check_memory_bounds(max_memory)?;
        Ok(Self {
            list: RecencyList::new(),
            elem_count: 0,
            elem_size: 0,
            max_memory,
            weigher: Box::new(weigher),
            control: Arc::new(SweepControl::new(DEFAULT_GC_PERIOD)),
            last_sweep_at: Instant::now(),
            stats: CacheStats::new(),
        })
    }

    /// Sweep flag and GC period, shared with the cache handle.
    pub fn control(&self) -> &Arc<SweepControl> {
        &self.control
    }

    // == Set Max Memory ==
    /// Parses a size specification such as `32KB` and applies it as the budget.
    pub fn set_max_memory(&mut self, spec: &str) -> Result<()> {
        let bytes = parse_memory_size(spec)?;
        self.set_max_memory_bytes(bytes)
    }

    /// Applies a new budget, evicting LRU entries if the contents no longer fit.
    pub fn set_max_memory_bytes(&mut self, bytes: usize) -> Result<()> {
        check_memory_bounds(bytes)?;
        self.max_memory = bytes;
        let evicted = self.evict_until_fits(0);
        info!(max_memory = bytes, evicted, "Memory budget updated");
        Ok(())
    }

    pub fn set_gc_period(&self, period: Duration) {
        self.control.set_gc_period(period);
    }

    // == Set ==
    /// Stores a value under `key`.
    ///
    /// A zero `ttl` never expires; a negative one fails with
    /// `InvalidExpiration` and leaves the store untouched. Overwriting a key
    /// refreshes it in place; eviction runs only if the new weight pushes the
    /// store over budget. Inserting a new key first tries a sweep, then evicts
    /// from the LRU end until it fits.
    pub fn set(&mut self, key: String, value: V, ttl: TimeDelta) -> Result<()> {
        self.set_at(key, value, ttl, Instant::now())
    }

    pub(crate) fn set_at(&mut self, key: String, value: V, ttl: TimeDelta, now: Instant) -> Result<()> {
        let expiry = Expiry::from_ttl(ttl, now)?;
        let weight = self.weigher.weight(&key, &value);

        if let Some(id) = self.list.find(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                let old_weight = entry.weight;
                entry.refresh(value, weight, expiry);
                self.elem_size -= old_weight;
                self.elem_size += weight;
            }
            self.list.move_to_front(id);
            if self.elem_size > self.max_memory {
                self.fit_refreshed(id, weight, now);
            }
            return Ok(());
        }

        if self.elem_size + weight > self.max_memory {
            self.try_sweep_at(now);
        }
        self.evict_until_fits(weight);
        if self.elem_size + weight > self.max_memory {
            warn!(
                key = %key,
                weight,
                max_memory = self.max_memory,
                "Entry heavier than the whole budget, not stored"
            );
            return Ok(());
        }

        self.list
            .insert_front(CacheEntry::new(key, value, weight, expiry));
        self.elem_count += 1;
        self.elem_size += weight;
        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key` and marks it most recently used.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<&V> {
        let Some(id) = self.live_entry(key, now) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    // == Exists ==
    /// Like `get` without returning the value or touching recency.
    pub fn exists(&mut self, key: &str) -> bool {
        self.exists_at(key, Instant::now())
    }

    pub(crate) fn exists_at(&mut self, key: &str, now: Instant) -> bool {
        self.live_entry(key, now).is_some()
    }

    // == Delete ==
    /// Removes `key` whether or not it has expired.
    pub fn del(&mut self, key: &str) -> bool {
        match self.list.find(key) {
            Some(id) => self.remove_entry(id).is_some(),
            None => false,
        }
    }

    // == Flush ==
    /// Drops every entry and resets the counters.
    pub fn flush(&mut self) -> bool {
        self.list.clear();
        self.elem_count = 0;
        self.elem_size = 0;
        true
    }

    // == Keys ==
    /// Number of resident entries, including expired ones not yet reclaimed.
    pub fn keys(&self) -> usize {
        self.elem_count
    }

    pub fn memory_used(&self) -> usize {
        self.elem_size
    }

    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    pub fn last_sweep_at(&self) -> Instant {
        self.last_sweep_at
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.elem_count, self.elem_size, self.max_memory);
        stats
    }

    // == Try Sweep ==
    /// Removes every expired entry if the sweep guard allows it.
    ///
    /// Returns the number of entries removed, or `None` if the sweep was
    /// skipped.
    pub fn try_sweep(&mut self) -> Option<usize> {
        self.try_sweep_at(Instant::now())
    }

    pub(crate) fn try_sweep_at(&mut self, now: Instant) -> Option<usize> {
        let since_last = now.saturating_duration_since(self.last_sweep_at);
        let gc_period = self.control.gc_period();
        if !should_sweep(since_last, gc_period, self.elem_size, self.max_memory) {
            return None;
        }

        let control = Arc::clone(&self.control);
        let Some(_guard) = control.begin() else {
            debug!("Sweep already in progress, skipping");
            return None;
        };

        let expired: Vec<EntryId> = self
            .list
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(id, _)| id)
            .collect();
        for id in &expired {
            self.remove_entry(*id);
        }

        self.last_sweep_at = now;
        self.stats.record_expirations(expired.len());
        self.stats.record_sweep(Utc::now());

        if expired.is_empty() {
            debug!(entries = self.elem_count, "Sweep found no expired entries");
        } else {
            info!(
                removed = expired.len(),
                entries = self.elem_count,
                memory_used = self.elem_size,
                "Sweep removed expired entries"
            );
        }
        Some(expired.len())
    }

    /// Finds `key`, lazily reclaiming it if it has expired.
    fn live_entry(&mut self, key: &str, now: Instant) -> Option<EntryId> {
        let id = self.list.find(key)?;
        if self.list.get(id).is_some_and(|entry| entry.is_expired(now)) {
            self.remove_entry(id);
            self.stats.record_expirations(1);
            return None;
        }
        Some(id)
    }

    fn remove_entry(&mut self, id: EntryId) -> Option<CacheEntry<V>> {
        let entry = self.list.remove(id)?;
        self.elem_count -= 1;
        self.elem_size -= entry.weight;
        Some(entry)
    }

    // == Evict ==
    /// Pops LRU entries until `incoming` more weight fits in the budget.
    fn evict_until_fits(&mut self, incoming: usize) -> usize {
        let mut evicted = 0;
        while self.elem_size + incoming > self.max_memory {
            let Some(entry) = self.list.pop_back() else {
                break;
            };
            self.elem_count -= 1;
            self.elem_size -= entry.weight;
            self.stats.record_eviction();
            trace!(key = %entry.key, weight = entry.weight, "Evicted LRU entry");
            evicted += 1;
        }
        evicted
    }

    /// Restores the budget after an in-place update grew entry `id`.
    ///
    /// `id` sits at the front, so tail eviction reaches it only once it is the
    /// last entry. An entry heavier than the whole budget is dropped and the
    /// store emptied, as for an oversized insert.
    fn fit_refreshed(&mut self, id: EntryId, weight: usize, now: Instant) {
        if weight > self.max_memory {
            if let Some(entry) = self.remove_entry(id) {
                warn!(
                    key = %entry.key,
                    weight,
                    max_memory = self.max_memory,
                    "Updated entry heavier than the whole budget, dropped"
                );
            }
            self.evict_until_fits(weight);
            return;
        }
        self.try_sweep_at(now);
        self.evict_until_fits(0);
    }

    // == Invariant Check ==
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        self.list.validate();
        assert_eq!(self.elem_count, self.list.len());
        let total: usize = self.list.iter().map(|(_, entry)| entry.weight).sum();
        assert_eq!(self.elem_size, total);
        assert!(self.elem_size <= self.max_memory);
    }

    #[cfg(test)]
    pub(crate) fn recency_keys(&self) -> Vec<String> {
        self.list.iter().map(|(_, entry)| entry.key.clone()).collect()
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("elem_count", &self.elem_count)
            .field("elem_size", &self.elem_size)
            .field("max_memory", &self.max_memory)
            .field("control", &self.control)
            .field("last_sweep_at", &self.last_sweep_at)
            .finish_non_exhaustive()
    }
}
