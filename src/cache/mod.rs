//! Shared in-memory object cache
//!
//! One [`ObjectCache`] is created at startup and handed to every connection
//! task behind an `Arc`. All state (recency order, membership, byte count)
//! lives in a [`CacheStore`] guarded by a single lock. Lookups take the write
//! side too, since a hit reorders recency.

pub mod key;
pub mod store;


pub use key::CacheKey;
pub use store::{CacheEntry, CacheStore};

use bytes::Bytes;
use tokio::sync::RwLock;

/// Default aggregate capacity in bytes.
pub const MAX_CACHE_SIZE: usize = 1_049_000;

/// Default per-object capture ceiling in bytes.
pub const MAX_OBJECT_SIZE: usize = 102_400;

/// Concurrent LRU cache of raw origin responses.
pub struct ObjectCache {
    inner: RwLock<CacheStore>,
}

impl ObjectCache {
    /// Creates an empty cache holding at most `max_size` bytes.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: RwLock::new(CacheStore::new(max_size)),
        }
    }

    /// Returns a handle to the cached payload and marks it most recently used.
    ///
    /// The returned `Bytes` is immutable and independent of later evictions.
    pub async fn lookup(&self, key: &CacheKey) -> Option<Bytes> {
        self.inner.write().await.get(key)
    }

    /// Stores `payload` under `key`, replacing any existing entry.
    ///
    /// Payloads larger than the whole cache are silently skipped.
    pub async fn put(&self, key: CacheKey, payload: Bytes) {
        let mut store = self.inner.write().await;
        if store.insert(key, payload) {
            tracing::debug!(
                entries = store.len(),
                total_size = store.total_size(),
                "Cache updated"
            );
        }
    }

    /// Releases every entry. Meant for shutdown.
    pub async fn teardown(&self) {
        let mut store = self.inner.write().await;
        let released = store.len();
        store.clear();
        tracing::info!(released, "Cache torn down");
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.read().await.contains(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn total_size(&self) -> usize {
        self.inner.read().await.total_size()
    }

    pub async fn capacity(&self) -> usize {
        self.inner.read().await.max_size()
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE)
    }
}
