//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{
    parse_memory_size, DEFAULT_GC_PERIOD, DEFAULT_MAX_MEMORY, DEFAULT_SWEEP_INTERVAL,
};
use crate::error::Result;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Memory budget in bytes
    pub max_memory: usize,
    /// Interval between proactive sweeps
    pub gc_period: Duration,
    /// How often the background sweeper attempts a sweep
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_MEMORY` - Memory budget such as `64MB` (default: 100MB)
    /// - `GC_PERIOD` - Seconds between proactive sweeps (default: 120)
    /// - `SWEEP_INTERVAL_MS` - Sweeper poll interval in milliseconds (default: 1000)
    ///
    /// A malformed `MAX_MEMORY` fails with `InvalidMemorySize`; unparsable
    /// numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let max_memory = match env::var("MAX_MEMORY") {
            Ok(spec) => parse_memory_size(spec.trim())?,
            Err(_) => DEFAULT_MAX_MEMORY,
        };

        Ok(Self {
            max_memory,
            gc_period: env::var("GC_PERIOD")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_GC_PERIOD),
            sweep_interval: env::var("SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            gc_period: DEFAULT_GC_PERIOD,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::UNIT_MB;
    use crate::error::CacheError;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_memory, 100 * UNIT_MB);
        assert_eq!(config.gc_period, Duration::from_secs(120));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
    }

    // Single test touching the environment so parallel tests don't race on it
    #[test]
    fn test_config_from_env() {
        env::remove_var("MAX_MEMORY");
        env::remove_var("GC_PERIOD");
        env::remove_var("SWEEP_INTERVAL_MS");
        assert_eq!(Config::from_env().unwrap(), Config::default());

        env::set_var("MAX_MEMORY", "64mb");
        env::set_var("GC_PERIOD", "30");
        env::set_var("SWEEP_INTERVAL_MS", "not-a-number");
        let config = Config::from_env().unwrap();
        assert_eq!(config.max_memory, 64 * UNIT_MB);
        assert_eq!(config.gc_period, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));

        env::set_var("MAX_MEMORY", "5GB");
        assert_eq!(
            Config::from_env(),
            Err(CacheError::InvalidMemorySize("5GB".to_string()))
        );

        env::remove_var("MAX_MEMORY");
        env::remove_var("GC_PERIOD");
        env::remove_var("SWEEP_INTERVAL_MS");
    }
}
