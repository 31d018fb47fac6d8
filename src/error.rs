//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use chrono::TimeDelta;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Every variant describes caller misuse. Absent, expired or evicted keys are
/// reported through `Option`/`bool` results, never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Malformed, non-positive or out-of-range memory size specification
    #[error("Invalid memory size: {0:?}")]
    InvalidMemorySize(String),

    /// Negative TTL passed to `set`
    #[error("Invalid expiration: {0}")]
    InvalidExpiration(TimeDelta),

    /// Background sweeper requested outside of a Tokio runtime
    #[error("No Tokio runtime available to run the background sweeper")]
    RuntimeUnavailable,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::InvalidMemorySize("1.5GB".to_string());
        assert_eq!(err.to_string(), "Invalid memory size: \"1.5GB\"");

        let err = CacheError::InvalidExpiration(TimeDelta::seconds(-1));
        assert!(err.to_string().starts_with("Invalid expiration"));
    }
}
