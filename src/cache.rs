//! Memo cache for evaluations over shared expression DAGs.
//!
//! Expressions are hash-consed, so the same sub-expression is typically
//! reached through many parents. The evaluators keep one cache per
//! evaluation pass; it is only valid while the byte tables it was computed
//! from stay unchanged, so it is never kept across forcing steps.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Lookup counters of a [`Cache`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.hits + self.misses;
        if total == 0 {
            write!(f, "no lookups")
        } else {
            let rate = 100.0 * self.hits as f64 / total as f64;
            write!(f, "{} hits / {} lookups ({:.1}%)", self.hits, total, rate)
        }
    }
}

pub struct Cache<K, V> {
    map: HashMap<K, V>,
    stats: CacheStats,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new(8)
    }
}

impl<K, V> Cache<K, V> {
    /// An empty cache with room for `2^bits` entries before it grows.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");
        Self {
            map: HashMap::with_capacity(1 << bits),
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry; the counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: Hash + Eq, V: Clone> Cache<K, V> {
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<V> {
        let found = self.map.get(key).cloned();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_and_misses() {
        let mut cache = Cache::<u32, u64>::new(4);
        cache.insert(1, 42);
        cache.insert(3, 99);

        assert_eq!(cache.get(&1), Some(42));
        assert_eq!(cache.get(&3), Some(99));
        assert_eq!(cache.get(&5), None);

        assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 1 });
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().to_string(), "2 hits / 3 lookups (66.7%)");
    }

    #[test]
    fn test_cached_none_is_a_hit() {
        let mut cache = Cache::<u32, Option<u64>>::new(2);
        cache.insert(1, None);
        assert_eq!(cache.get(&1), Some(None));

        cache.clear();
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }
}
