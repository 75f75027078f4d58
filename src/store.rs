//! Bounded key-value store with least-recently-used eviction.
//!
//! Entries live in an `IndexMap` in recency order: the front is the oldest,
//! a hit moves the entry to the back. An optional time-to-live expires
//! entries on access.

use std::hash::Hash;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted: Instant,
}

/// LRU store with an optional entry lifetime.
#[derive(Debug, Clone)]
pub struct LruStore<K, V> {
    entries: IndexMap<K, Entry<V>>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl<K: Hash + Eq, V: Clone> LruStore<K, V> {
    /// Create a store holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
            ttl: None,
        }
    }

    /// Expire entries older than `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries, including any not yet expired on access.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn expired(&self, entry: &Entry<V>) -> bool {
        self.ttl
            .map(|ttl| entry.inserted.elapsed() > ttl)
            .unwrap_or(false)
    }

    /// Look up `key`, refreshing its recency.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let index = self.entries.get_index_of(key)?;
        if self.expired(&self.entries[index]) {
            self.entries.shift_remove_index(index);
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, e)| e.value.clone())
    }

    /// Insert or replace `key`, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.shift_remove(&key);
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
            },
        );
    }

    /// Drop every entry matching `pred`. Returns how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !pred(k));
        before - self.entries.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut store = LruStore::new(2);
        store.insert("a", 1);
        store.insert("b", 2);
        assert_eq!(store.get(&"a"), Some(1));
        store.insert("c", 3);
        assert_eq!(store.get(&"b"), None);
        assert_eq!(store.get(&"a"), Some(1));
        assert_eq!(store.get(&"c"), Some(3));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reinsert_replaces_value() {
        let mut store = LruStore::new(2);
        store.insert(1, "x");
        store.insert(1, "y");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&1), Some("y"));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut store = LruStore::new(0);
        store.insert(1, 1);
        store.insert(2, 2);
        assert_eq!(store.capacity(), 1);
        assert_eq!(store.get(&2), Some(2));
    }

    #[test]
    fn test_ttl_expires_entries() {
        let mut store = LruStore::new(4).with_ttl(Duration::from_millis(0));
        store.insert(1, 1);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.get(&1), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_where() {
        let mut store = LruStore::new(8);
        for i in 0..6 {
            store.insert(i, i * 10);
        }
        assert_eq!(store.remove_where(|k| k % 2 == 0), 3);
        assert_eq!(store.get(&1), Some(10));
        assert_eq!(store.get(&2), None);
    }
}
