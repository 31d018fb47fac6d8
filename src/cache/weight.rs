//! Weight Module
//!
//! Cost function charging each entry against the memory budget.

use crate::cache::DEFAULT_ENTRY_WEIGHT;

// == Weigher ==
/// Computes the approximate memory cost of an entry.
///
/// Implemented for any `Fn(&str, &V) -> usize` closure.
pub trait Weigher<V>: Send + Sync {
    fn weight(&self, key: &str, value: &V) -> usize;
}

impl<V, F> Weigher<V> for F
where
    F: Fn(&str, &V) -> usize + Send + Sync,
{
    fn weight(&self, key: &str, value: &V) -> usize {
        self(key, value)
    }
}

// == Fixed Weigher ==
/// Charges the same cost for every entry regardless of payload size.
///
/// The default of 32 counts 16 for the key reference and 16 for the value
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWeigher(pub usize);

impl Default for FixedWeigher {
    fn default() -> Self {
        FixedWeigher(DEFAULT_ENTRY_WEIGHT)
    }
}

impl<V> Weigher<V> for FixedWeigher {
    fn weight(&self, _key: &str, _value: &V) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_weigher_ignores_payload() {
        let weigher = FixedWeigher::default();
        assert_eq!(Weigher::<String>::weight(&weigher, "k", &"x".repeat(4096)), 32);
        assert_eq!(Weigher::<u8>::weight(&weigher, "a-much-longer-key", &1), 32);
    }

    #[test]
    fn test_closure_weigher() {
        let weigher = |key: &str, value: &Vec<u8>| key.len() + value.len();
        assert_eq!(weigher.weight("abc", &vec![0; 10]), 13);
    }
}
