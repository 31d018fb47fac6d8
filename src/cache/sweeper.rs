//! Sweep Control Module
//!
//! Decides when an active sweep of expired entries may run and keeps the
//! reentrancy flag that stops two sweeps from overlapping.
//!
//! A sweep runs only when all of these hold:
//! 1. no other sweep is in progress
//! 2. more than [`MIN_GC_PERIOD`] has passed since the last sweep
//! 3. the configured GC period has passed, or usage is above 3/4 of the budget
//!
//! The engine lock already serialises sweeps today. The flag lives outside
//! that lock so the rule still holds if locking ever becomes finer grained,
//! and so callers can observe a sweep in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::cache::MIN_GC_PERIOD;

// == Should Sweep ==
/// Time and pressure part of the guard condition.
pub fn should_sweep(
    since_last: Duration,
    gc_period: Duration,
    memory_used: usize,
    max_memory: usize,
) -> bool {
    let under_pressure = memory_used as u128 * 4 > max_memory as u128 * 3;
    since_last > MIN_GC_PERIOD && (since_last > gc_period || under_pressure)
}

// == Sweep Control ==
/// Sweep configuration and status shared between the cache handle, the
/// engine and the background task.
#[derive(Debug)]
pub struct SweepControl {
    in_progress: AtomicBool,
    gc_period_nanos: AtomicU64,
}

impl SweepControl {
    pub fn new(gc_period: Duration) -> Self {
        Self {
            in_progress: AtomicBool::new(false),
            gc_period_nanos: AtomicU64::new(duration_to_nanos(gc_period)),
        }
    }

    pub fn gc_period(&self) -> Duration {
        Duration::from_nanos(self.gc_period_nanos.load(Ordering::Relaxed))
    }

    /// Replaces the GC period; only affects cadence, so no lock is needed.
    pub fn set_gc_period(&self, period: Duration) {
        self.gc_period_nanos
            .store(duration_to_nanos(period), Ordering::Relaxed);
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    // == Begin ==
    /// Atomically claims the sweep flag.
    ///
    /// Returns `None` if another sweep holds it. The flag is released when the
    /// returned guard drops, including during unwinding.
    pub fn begin(&self) -> Option<SweepGuard<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SweepGuard { control: self })
    }
}

fn duration_to_nanos(period: Duration) -> u64 {
    u64::try_from(period.as_nanos()).unwrap_or(u64::MAX)
}

// == Sweep Guard ==
#[derive(Debug)]
pub struct SweepGuard<'a> {
    control: &'a SweepControl,
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.control.in_progress.store(false, Ordering::Release);
    }
}
