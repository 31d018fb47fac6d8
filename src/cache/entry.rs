//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Instant;

use chrono::TimeDelta;

use crate::cache::EntryId;
use crate::error::{CacheError, Result};

// == Expiry ==
/// Absolute expiration point of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Stored without a TTL
    Never,
    /// Expires once this instant is reached
    At(Instant),
}

impl Expiry {
    // == From TTL ==
    /// Converts a relative TTL into an absolute expiry.
    ///
    /// A zero TTL means the entry never expires; a negative TTL is rejected.
    pub fn from_ttl(ttl: TimeDelta, now: Instant) -> Result<Self> {
        if ttl < TimeDelta::zero() {
            return Err(CacheError::InvalidExpiration(ttl));
        }
        if ttl.is_zero() {
            return Ok(Expiry::Never);
        }
        let ttl = ttl.to_std().map_err(|_| CacheError::InvalidExpiration(ttl))?;
        Ok(now.checked_add(ttl).map_or(Expiry::Never, Expiry::At))
    }

    // == Is Expired ==
    /// An entry is expired once `now` has reached the expiration instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(at) => now >= *at,
        }
    }

    /// Remaining lifetime, `None` for entries that never expire.
    #[cfg(test)]
    pub(crate) fn remaining(&self, now: Instant) -> Option<std::time::Duration> {
        match self {
            Expiry::Never => None,
            Expiry::At(at) => Some(at.saturating_duration_since(now)),
        }
    }
}

// == Cache Entry ==
/// A resident key/value pair together with its accounting and list links.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    /// Approximate memory cost charged against the budget
    pub weight: usize,
    pub expiry: Expiry,
    pub(crate) prev: Option<EntryId>,
    pub(crate) next: Option<EntryId>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: V, weight: usize, expiry: Expiry) -> Self {
        Self {
            key,
            value,
            weight,
            expiry,
            prev: None,
            next: None,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.is_expired(now)
    }

    // == Refresh ==
    /// Replaces the payload in place, keeping the entry's identity and links.
    ///
    /// Returns the previous value.
    pub fn refresh(&mut self, value: V, weight: usize, expiry: Expiry) -> V {
        self.weight = weight;
        self.expiry = expiry;
        std::mem::replace(&mut self.value, value)
    }
}
