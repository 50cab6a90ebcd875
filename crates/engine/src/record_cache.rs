//! Thin typed wrapper around [`lru_cache::LruCache`] keyed by raw key
//! bytes and holding shared ownership of the cached record's value, so
//! the cache never invalidates a read already in progress against the
//! buffer it was populated from.

use std::sync::Arc;

use lru_cache::LruCache;
use memtable::KVRecord;

pub(crate) struct RecordCache {
    inner: LruCache<Vec<u8>, Arc<KVRecord>>,
}

impl RecordCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: LruCache::new(capacity.max(1)),
        }
    }

    pub(crate) fn get(&mut self, key: &[u8]) -> Option<Arc<KVRecord>> {
        self.inner.get(&key.to_vec())
    }

    pub(crate) fn insert(&mut self, key: Vec<u8>, record: Arc<KVRecord>) {
        self.inner.insert(key, record);
    }

    pub(crate) fn remove(&mut self, key: &[u8]) {
        self.inner.remove(&key.to_vec());
    }
}
