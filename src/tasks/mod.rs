//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Sweep: removes expired cache entries at a fixed poll interval

mod sweep;

pub use sweep::{spawn_sweep_task, MIN_SWEEP_INTERVAL};
