//! LRU TTL Cache - An in-process, memory-bounded cache
//!
//! Provides key/value storage with per-entry TTL expiration and LRU eviction
//! under a configurable memory budget.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, FixedWeigher, LruCache, Weigher};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
