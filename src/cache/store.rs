//! Size-bounded LRU store.
//!
//! Single-threaded core of the object cache. [`ObjectCache`](super::ObjectCache)
//! wraps it in a lock; everything here assumes exclusive access.

use bytes::Bytes;
use lru::LruCache;

use crate::cache::CacheKey;

/// A cached response: raw header block plus body as received from origin.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Bytes,
    pub size: usize,
}

impl CacheEntry {
    pub fn new(payload: Bytes) -> Self {
        let size = payload.len();
        Self { payload, size }
    }
}

/// Byte-budgeted LRU map.
///
/// The underlying `LruCache` is unbounded; capacity is enforced in bytes via
/// `total_size`, which always equals the sum of entry sizes.
pub struct CacheStore {
    entries: LruCache<CacheKey, CacheEntry>,
    total_size: usize,
    max_size: usize,
}

impl CacheStore {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            total_size: 0,
            max_size,
        }
    }

    /// Returns the payload for `key` and marks it most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<Bytes> {
        self.entries.get(key).map(|entry| entry.payload.clone())
    }

    /// Inserts `payload` under `key`, evicting least recently used entries
    /// until it fits.
    ///
    /// Returns `false` (and leaves the store untouched) if the payload alone
    /// is larger than the whole budget.
    pub fn insert(&mut self, key: CacheKey, payload: Bytes) -> bool {
        let size = payload.len();
        if size > self.max_size {
            tracing::debug!(key = %key, size, max = self.max_size, "Object exceeds cache capacity, not admitted");
            return false;
        }

        if let Some(old) = self.entries.pop(&key) {
            self.total_size -= old.size;
        }

        while self.total_size + size > self.max_size {
            match self.entries.pop_lru() {
                Some((evicted, entry)) => {
                    self.total_size -= entry.size;
                    tracing::debug!(key = %evicted, size = entry.size, "Evicted cache entry");
                }
                None => break,
            }
        }

        // unreachable while size <= max_size, kept so a broken count can't overfill
        if self.total_size + size > self.max_size {
            return false;
        }

        self.entries.push(key, CacheEntry::new(payload));
        self.total_size += size;
        true
    }

    /// Membership test that does not touch recency.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_size = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CacheKey {
        CacheKey::new(s, "80", "/")
    }

    fn payload(len: usize) -> Bytes {
        Bytes::from(vec![b'x'; len])
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
        assert_eq!(store.max_size(), 100);
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = CacheStore::new(100);

        assert!(store.insert(key("a"), Bytes::from_static(b"hello")));
        assert_eq!(store.get(&key("a")), Some(Bytes::from_static(b"hello")));
        assert_eq!(store.total_size(), 5);
    }

    #[test]
    fn test_store_get_missing() {
        let mut store = CacheStore::new(100);
        assert_eq!(store.get(&key("nope")), None);
    }

    #[test]
    fn test_store_overwrite_replaces_size() {
        let mut store = CacheStore::new(100);

        store.insert(key("a"), payload(40));
        store.insert(key("a"), payload(10));

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_size(), 10);
        assert_eq!(store.get(&key("a")).map(|p| p.len()), Some(10));
    }

    #[test]
    fn test_store_exact_capacity_admitted() {
        let mut store = CacheStore::new(100);

        assert!(store.insert(key("a"), payload(100)));
        assert_eq!(store.total_size(), 100);
    }

    #[test]
    fn test_store_oversized_rejected_without_eviction() {
        let mut store = CacheStore::new(100);
        store.insert(key("a"), payload(30));
        store.insert(key("b"), payload(30));

        assert!(!store.insert(key("huge"), payload(101)));

        assert_eq!(store.len(), 2);
        assert_eq!(store.total_size(), 60);
        assert!(!store.contains(&key("huge")));
    }

    #[test]
    fn test_store_evicts_least_recently_used() {
        let mut store = CacheStore::new(100);
        store.insert(key("a"), payload(50));
        store.insert(key("b"), payload(50));

        store.get(&key("a"));
        store.insert(key("c"), payload(50));

        assert!(store.contains(&key("a")));
        assert!(!store.contains(&key("b")));
        assert!(store.contains(&key("c")));
        assert_eq!(store.total_size(), 100);
    }

    #[test]
    fn test_store_evicts_as_many_as_needed() {
        let mut store = CacheStore::new(100);
        store.insert(key("a"), payload(30));
        store.insert(key("b"), payload(30));
        store.insert(key("c"), payload(30));

        store.insert(key("d"), payload(70));

        assert!(!store.contains(&key("a")));
        assert!(!store.contains(&key("b")));
        assert!(store.contains(&key("c")));
        assert!(store.contains(&key("d")));
        assert_eq!(store.total_size(), 100);
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(100);
        store.insert(key("a"), payload(30));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
    }
}
