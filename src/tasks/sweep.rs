//! Expiration Sweep Task
//!
//! Background task that periodically attempts a guarded sweep of expired
//! cache entries.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Shortest poll interval the task accepts.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a background task that attempts a sweep every `interval`.
///
/// Each attempt takes the cache lock for one pass; whether a sweep actually
/// runs is decided by the store's guard (floor, GC period, memory pressure).
/// The task only holds a weak reference and exits once the cache is dropped.
///
/// # Arguments
/// * `cache` - Weak reference to the locked store
/// * `interval` - Poll interval, clamped to [`MIN_SWEEP_INTERVAL`]
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
pub fn spawn_sweep_task<V>(cache: Weak<Mutex<CacheStore<V>>>, interval: Duration) -> JoinHandle<()>
where
    V: Send + 'static,
{
    let interval = interval.max(MIN_SWEEP_INTERVAL);

    tokio::spawn(async move {
        info!("Starting expiration sweeper polling every {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(store) = cache.upgrade() else {
                debug!("Cache dropped, stopping expiration sweeper");
                break;
            };
            let removed = store.lock().try_sweep();

            match removed {
                Some(0) => debug!("Sweep: no expired entries found"),
                Some(count) => info!("Sweep: removed {} expired entries", count),
                None => {}
            }
        }
    })
}
