//! Session memo cache keyed by selector state.
//!
//! A bounded map from `SelectorKey` to a computed value. Entries are evicted
//! oldest-inserted first once `capacity` is reached. Nothing is written to
//! disk; the cache lives and dies with the session.

use std::collections::{HashMap, VecDeque};

use log::{debug, warn};
use serde::Serialize;

use crate::domain::SelectorKey;

/// Hit/miss/eviction counters, shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded FIFO memo cache.
#[derive(Debug)]
pub struct SelectorCache<V> {
    capacity: usize,
    entries: HashMap<SelectorKey, V>,
    order: VecDeque<SelectorKey>,
    stats: CacheStats,
}

impl<V: Clone> SelectorCache<V> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up a key, counting the hit or miss.
    pub fn get(&mut self, key: &SelectorKey) -> Option<V> {
        match self.entries.get(key) {
            Some(v) => {
                self.stats.hits += 1;
                debug!("cache hit {key}");
                Some(v.clone())
            }
            None => {
                self.stats.misses += 1;
                debug!("cache miss {key}");
                None
            }
        }
    }

    /// Store a value. Replacing an existing key keeps its insertion position.
    pub fn insert(&mut self, key: SelectorKey, value: V) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            warn!(
                "cache full ({} entries), evicted {oldest}",
                self.capacity
            );
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn contains(&self, key: &SelectorKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        debug!("cache cleared ({} entries)", self.entries.len());
        self.entries.clear();
        self.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryQuery, SelectorState};

    fn key(day: &str) -> SelectorKey {
        SelectorState::category(CategoryQuery::new().with_equal("day", day)).cache_key()
    }

    #[test]
    fn get_counts_hits_and_misses() {
        let mut c = SelectorCache::new(4);
        assert_eq!(c.get(&key("Sun")), None);
        c.insert(key("Sun"), 1);
        assert_eq!(c.get(&key("Sun")), Some(1));
        assert_eq!(
            c.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn oldest_entry_is_evicted_first() {
        let mut c = SelectorCache::new(2);
        c.insert(key("Thur"), 1);
        c.insert(key("Fri"), 2);
        // Reading does not refresh position.
        assert_eq!(c.get(&key("Thur")), Some(1));
        c.insert(key("Sat"), 3);

        assert_eq!(c.len(), 2);
        assert!(!c.contains(&key("Thur")));
        assert!(c.contains(&key("Fri")));
        assert!(c.contains(&key("Sat")));
        assert_eq!(c.stats().evictions, 1);
    }

    #[test]
    fn replacing_a_key_does_not_evict() {
        let mut c = SelectorCache::new(2);
        c.insert(key("Thur"), 1);
        c.insert(key("Fri"), 2);
        c.insert(key("Thur"), 10);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&key("Thur")), Some(10));
        assert_eq!(c.stats().evictions, 0);
    }

    #[test]
    fn clear_keeps_counters() {
        let mut c = SelectorCache::new(0);
        assert_eq!(c.capacity(), 1);
        c.insert(key("Sun"), 1);
        let _ = c.get(&key("Sun"));
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.get(&key("Sun")), None);
        assert_eq!(c.stats().hits, 1);
        assert_eq!(c.stats().misses, 1);
    }
}
