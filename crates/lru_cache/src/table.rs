use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ptr;

use crate::Node;

const LOAD_FACTOR_THRESHOLD: f64 = 0.75;
const INITIAL_BUCKETS: usize = 4096;

/// Separate-chaining hash table over the same nodes the LRU's recency
/// list links, with incremental rehashing: once the load factor is
/// crossed, a doubled table is allocated and one old bucket's chain is
/// migrated per subsequent insert/remove, so no single operation pays
/// for the whole rehash. Lookups during a rehash probe the old table
/// first, then the new one.
pub(crate) struct HashTable<K, V> {
    buckets: Vec<*mut Node<K, V>>,
    new_buckets: Vec<*mut Node<K, V>>,
    rehashing: bool,
    rehash_index: usize,
    elems: usize,
}

impl<K: Hash + Eq, V> HashTable<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            buckets: vec![ptr::null_mut(); INITIAL_BUCKETS],
            new_buckets: Vec::new(),
            rehashing: false,
            rehash_index: 0,
            elems: 0,
        }
    }

    fn bucket_index(key: &K, len: usize) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % len as u64) as usize
    }

    fn find_in_chain(mut head: *mut Node<K, V>, key: &K) -> Option<*mut Node<K, V>> {
        while !head.is_null() {
            if unsafe { &(*head).key } == key {
                return Some(head);
            }
            head = unsafe { (*head).next_hash };
        }
        None
    }

    fn unlink_from_chain(head: &mut *mut Node<K, V>, key: &K) -> Option<*mut Node<K, V>> {
        let mut cur = *head;
        let mut prev: *mut Node<K, V> = ptr::null_mut();
        while !cur.is_null() {
            if unsafe { &(*cur).key } == key {
                let next = unsafe { (*cur).next_hash };
                if prev.is_null() {
                    *head = next;
                } else {
                    unsafe { (*prev).next_hash = next };
                }
                return Some(cur);
            }
            prev = cur;
            cur = unsafe { (*cur).next_hash };
        }
        None
    }

    pub(crate) fn find(&self, key: &K) -> Option<*mut Node<K, V>> {
        let idx = Self::bucket_index(key, self.buckets.len());
        if let Some(n) = Self::find_in_chain(self.buckets[idx], key) {
            return Some(n);
        }
        if self.rehashing {
            let idx = Self::bucket_index(key, self.new_buckets.len());
            if let Some(n) = Self::find_in_chain(self.new_buckets[idx], key) {
                return Some(n);
            }
        }
        None
    }

    /// Inserts a freshly allocated node. Callers only call this after
    /// confirming the key is not already present.
    pub(crate) fn insert(&mut self, node: *mut Node<K, V>) {
        self.step_rehash();
        let key = unsafe { &(*node).key };
        let idx = Self::bucket_index(key, self.buckets.len());
        unsafe {
            (*node).next_hash = self.buckets[idx];
        }
        self.buckets[idx] = node;
        self.elems += 1;

        if !self.rehashing
            && self.elems as f64 / self.buckets.len() as f64 > LOAD_FACTOR_THRESHOLD
        {
            self.start_rehash();
        }
    }

    /// Unlinks and returns the node for `key`, if present. Does not free
    /// it — the caller (the node's owner) does that.
    pub(crate) fn remove(&mut self, key: &K) -> Option<*mut Node<K, V>> {
        self.step_rehash();
        let idx = Self::bucket_index(key, self.buckets.len());
        if let Some(node) = Self::unlink_from_chain(&mut self.buckets[idx], key) {
            self.elems -= 1;
            return Some(node);
        }
        if self.rehashing {
            let idx = Self::bucket_index(key, self.new_buckets.len());
            if let Some(node) = Self::unlink_from_chain(&mut self.new_buckets[idx], key) {
                self.elems -= 1;
                return Some(node);
            }
        }
        None
    }

    fn start_rehash(&mut self) {
        let new_len = self.buckets.len() * 2;
        self.new_buckets = vec![ptr::null_mut(); new_len];
        self.rehash_index = 0;
        self.rehashing = true;
        log::debug!("lru hash table rehash started: {} -> {new_len} buckets", self.buckets.len());
    }

    fn step_rehash(&mut self) {
        if !self.rehashing {
            return;
        }
        let mut current = self.buckets[self.rehash_index];
        while !current.is_null() {
            let next = unsafe { (*current).next_hash };
            let idx = Self::bucket_index(unsafe { &(*current).key }, self.new_buckets.len());
            unsafe {
                (*current).next_hash = self.new_buckets[idx];
            }
            self.new_buckets[idx] = current;
            current = next;
        }
        self.buckets[self.rehash_index] = ptr::null_mut();
        self.rehash_index += 1;

        if self.rehash_index == self.buckets.len() {
            self.buckets = std::mem::take(&mut self.new_buckets);
            self.rehashing = false;
            log::debug!("lru hash table rehash completed: {} buckets", self.buckets.len());
        }
    }
}
