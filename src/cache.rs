//! In-memory caching with a freshness window.

use std::hash::Hash;
use lfu_cache::LfuCache;

const DEFAULT_CAPACITY: usize = 1000;

/// A cache whose entries expire passively after a fixed age. Expiry is checked at read time;
/// stale entries are left in place so a failed refetch never discards previously good data,
/// and are simply overwritten by the next successful insert. Capacity is bounded; the least
/// frequently used entries are evicted once the cap is reached.
///
/// Callers supply the current timestamp, which keeps time injectable in tests.
#[derive(Debug)]
pub struct TimedCache<K, V>
where
    K: Hash + Eq,
{
    map: LfuCache<K, Entry<V>>,
    max_age_secs: u64,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    fetched_at: u64,
}

impl<K, V> TimedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(max_age_secs: u64) -> Self {
        Self::with_capacity(max_age_secs, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_age_secs: u64, capacity: usize) -> Self {
        Self {
            map: LfuCache::with_capacity(capacity),
            max_age_secs,
        }
    }

    /// Gets the value for `key` if one exists and is within the freshness window at `now`.
    pub fn get(&mut self, key: &K, now: u64) -> Option<V> {
        match self.map.get(key) {
            Some(entry) if now.saturating_sub(entry.fetched_at) < self.max_age_secs => {
                Some(entry.value.clone())
            },
            _ => None,
        }
    }

    /// Inserts a value fetched at `now`, replacing any previous entry wholesale.
    pub fn insert(&mut self, key: K, value: V, now: u64) {
        self.map.insert(key, Entry {
            value,
            fetched_at: now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_entries() {
        let mut cache = TimedCache::new(60);

        cache.insert("key", 1, 100);

        assert_eq!(cache.get(&"key", 130), Some(1));
    }

    #[test]
    fn expires_stale_entries() {
        let mut cache = TimedCache::new(60);

        cache.insert("key", 1, 100);

        assert_eq!(cache.get(&"key", 160), None);
    }

    #[test]
    fn replaces_entries_wholesale() {
        let mut cache = TimedCache::new(60);

        cache.insert("key", 1, 100);
        cache.insert("key", 2, 170);

        assert_eq!(cache.get(&"key", 180), Some(2));
    }
}
