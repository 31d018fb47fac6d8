//! LRU Cache Module
//!
//! Thread-safe handle over [`CacheStore`]. A single mutex serialises every
//! structural change; the optional background sweeper takes the same lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::TimeDelta;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, SweepControl, Weigher};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == LRU Cache ==
/// Memory-bounded cache with TTL expiration and LRU eviction.
///
/// Dropping the cache stops its background sweeper.
///
/// # Example
/// ```no_run
/// use chrono::TimeDelta;
/// use lru_ttl_cache::{Config, LruCache};
///
/// # async fn run() -> lru_ttl_cache::error::Result<()> {
/// let cache = LruCache::start(&Config::default())?;
/// cache.set_max_memory("32KB")?;
/// cache.set("session", "alice".to_string(), TimeDelta::seconds(30))?;
/// assert_eq!(cache.get("session").as_deref(), Some("alice"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LruCache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
    control: Arc<SweepControl>,
    sweeper: Option<JoinHandle<()>>,
}

impl<V: Send + 'static> LruCache<V> {
    // == Constructors ==
    /// Creates a cache, spawning its periodic sweeper when called inside a
    /// Tokio runtime.
    ///
    /// Outside a runtime the cache still works; expired entries are then
    /// reclaimed only on access and by the pressure-triggered sweep on insert.
    pub fn new(config: &Config) -> Result<Self> {
        let mut cache = Self::without_sweeper(config)?;
        cache.spawn_sweeper_if_runtime(config.sweep_interval);
        Ok(cache)
    }

    /// Creates a cache charging entries with a custom cost function.
    ///
    /// The sweeper is spawned as for [`LruCache::new`].
    pub fn with_weigher(config: &Config, weigher: impl Weigher<V> + 'static) -> Result<Self> {
        let store = CacheStore::with_weigher(config.max_memory, weigher)?;
        let mut cache = Self::from_store(store, config);
        cache.spawn_sweeper_if_runtime(config.sweep_interval);
        Ok(cache)
    }

    /// Creates a cache that never runs the periodic sweeper.
    pub fn without_sweeper(config: &Config) -> Result<Self> {
        Ok(Self::from_store(CacheStore::new(config.max_memory)?, config))
    }

    /// Creates a cache and spawns its periodic sweeper, failing with
    /// `RuntimeUnavailable` outside a Tokio runtime.
    pub fn start(config: &Config) -> Result<Self> {
        let mut cache = Self::without_sweeper(config)?;
        cache.spawn_sweeper(config.sweep_interval)?;
        Ok(cache)
    }

    fn from_store(store: CacheStore<V>, config: &Config) -> Self {
        let control = Arc::clone(store.control());
        control.set_gc_period(config.gc_period);
        Self {
            store: Arc::new(Mutex::new(store)),
            control,
            sweeper: None,
        }
    }

    fn spawn_sweeper_if_runtime(&mut self, interval: Duration) {
        if self.spawn_sweeper(interval).is_err() {
            debug!("No Tokio runtime, periodic sweeper not started");
        }
    }

    // == Sweeper Lifecycle ==
    /// Spawns the periodic sweeper, replacing any running one.
    ///
    /// Fails with `RuntimeUnavailable` when called outside a Tokio runtime.
    pub fn spawn_sweeper(&mut self, interval: Duration) -> Result<()> {
        Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;
        self.stop_sweeper();
        self.sweeper = Some(spawn_sweep_task(Arc::downgrade(&self.store), interval));
        Ok(())
    }

    /// Aborts the periodic sweeper if one is running.
    pub fn stop_sweeper(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
            info!("Background sweeper stopped");
        }
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<V> LruCache<V> {
    // == Configuration ==
    /// Replaces the memory budget from a size specification like `100MB`.
    ///
    /// An invalid specification fails with `InvalidMemorySize` and leaves the
    /// current budget in place.
    pub fn set_max_memory(&self, spec: &str) -> Result<()> {
        self.store.lock().set_max_memory(spec)
    }

    /// Replaces the interval between proactive sweeps.
    pub fn set_gc_period(&self, period: Duration) {
        self.control.set_gc_period(period);
    }

    pub fn gc_period(&self) -> Duration {
        self.control.gc_period()
    }

    // == Operations ==
    /// Stores `value` under `key`; a zero `ttl` never expires.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: TimeDelta) -> Result<()> {
        self.store.lock().set(key.into(), value, ttl)
    }

    /// Returns a clone of the live value for `key`.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.store.lock().get(key).cloned()
    }

    /// Runs `f` on the live value for `key` without cloning it.
    pub fn get_with<R>(&self, key: &str, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.store.lock().get(key).map(f)
    }

    pub fn del(&self, key: &str) -> bool {
        self.store.lock().del(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.store.lock().exists(key)
    }

    pub fn flush(&self) -> bool {
        self.store.lock().flush()
    }

    /// Number of resident entries. Expired entries still count until they are
    /// accessed or swept.
    pub fn keys(&self) -> usize {
        self.store.lock().keys()
    }

    // == Observability ==
    pub fn memory_used(&self) -> usize {
        self.store.lock().memory_used()
    }

    pub fn max_memory(&self) -> usize {
        self.store.lock().max_memory()
    }

    pub fn last_sweep_at(&self) -> Instant {
        self.store.lock().last_sweep_at()
    }

    /// Whether a sweep is running right now.
    pub fn is_sweeping(&self) -> bool {
        self.control.in_progress()
    }

    /// Attempts a guarded sweep immediately.
    pub fn sweep_now(&self) -> Option<usize> {
        self.store.lock().try_sweep()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }
}

impl<V> Drop for LruCache<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}
