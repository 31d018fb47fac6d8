//! Memory Size Module
//!
//! Parses human-readable budget strings such as `32KB` or `1GB`.

use crate::cache::{MAX_MEMORY, MIN_MEMORY, UNIT_GB, UNIT_KB, UNIT_MB};
use crate::error::{CacheError, Result};

// == Parse Memory Size ==
/// Parses a memory size specification into a byte count.
///
/// The accepted form is a run of ASCII digits immediately followed by one of
/// `KB`, `MB` or `GB` (case-insensitive). Signs, fractions and missing units
/// are rejected, as is any result outside `[MIN_MEMORY, MAX_MEMORY]`.
pub fn parse_memory_size(spec: &str) -> Result<usize> {
    let invalid = || CacheError::InvalidMemorySize(spec.to_string());

    if spec.len() <= 2 || !spec.is_char_boundary(spec.len() - 2) {
        return Err(invalid());
    }
    let (digits, unit) = spec.split_at(spec.len() - 2);

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(invalid());
    }

    let multiplier = match unit.to_ascii_uppercase().as_str() {
        "KB" => UNIT_KB,
        "MB" => UNIT_MB,
        "GB" => UNIT_GB,
        _ => return Err(invalid()),
    };

    let bytes = amount.checked_mul(multiplier as u64).ok_or_else(invalid)?;
    let bytes = usize::try_from(bytes).map_err(|_| invalid())?;
    check_memory_bounds(bytes).map_err(|_| invalid())?;
    Ok(bytes)
}

// == Check Bounds ==
/// Rejects budgets outside `[MIN_MEMORY, MAX_MEMORY]`.
pub fn check_memory_bounds(bytes: usize) -> Result<()> {
    if (MIN_MEMORY..=MAX_MEMORY).contains(&bytes) {
        Ok(())
    } else {
        Err(CacheError::InvalidMemorySize(format!("{} bytes", bytes)))
    }
}
