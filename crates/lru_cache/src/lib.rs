//! Fixed-capacity LRU cache: a chained hash table with incremental
//! rehashing (see [`table::HashTable`]) plus an intrusive recency list.
//! Both structures index the same owned set of nodes — the hash table
//! for `O(1)` lookup by key, the list for `O(1)` recency updates.
//!
//! There is no teacher precedent for this component (`docflex-RiptideKV`
//! ships no read cache at all); it is translated directly from
//! `examples/original_source/util/LRUCache.h`, with the original's
//! `shared_ptr::use_count() == 1` "cache is the last owner, drop it
//! instead of updating" check replaced by explicit provenance tracking at
//! the call site (see `engine`), since inspecting a Rust `Arc`'s strong
//! count from inside the cache would be fragile — a caller merely holding
//! a temporary clone would look indistinguishable from "still owned
//! elsewhere".

mod table;

use std::hash::Hash;
use std::ptr;

use table::HashTable;

struct Node<K, V> {
    key: K,
    value: V,
    next_hash: *mut Node<K, V>,
    next: *mut Node<K, V>,
    prev: *mut Node<K, V>,
}

pub struct LruCache<K, V> {
    head: *mut Node<K, V>,
    tail: *mut Node<K, V>,
    table: HashTable<K, V>,
    capacity: usize,
    size: usize,
}

impl<K: Hash + Eq, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "lru cache capacity must be >= 1");
        Self {
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            table: HashTable::new(),
            capacity,
            size: 0,
        }
    }

    /// Front-inserts a new entry, or moves an existing one to the head
    /// and replaces its value. Evicts the tail if capacity is exceeded.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(existing) = self.table.find(&key) {
            unsafe {
                (*existing).value = value;
            }
            self.move_to_front(existing);
            return;
        }

        let node = Box::into_raw(Box::new(Node {
            key,
            value,
            next_hash: ptr::null_mut(),
            next: ptr::null_mut(),
            prev: ptr::null_mut(),
        }));
        self.table.insert(node);
        self.push_front(node);
        self.size += 1;

        if self.size > self.capacity {
            let evicted = self.tail;
            self.drop_node(evicted);
        }
    }

    /// Returns a clone of the cached value and moves it to the head, or
    /// `None` without affecting recency.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let found = self.table.find(key)?;
        self.move_to_front(found);
        Some(unsafe { (*found).value.clone() })
    }

    /// Membership check with no effect on recency.
    pub fn contains(&self, key: &K) -> bool {
        self.table.find(key).is_some()
    }

    /// Removes `key` from both structures. No-op if absent.
    pub fn remove(&mut self, key: &K) {
        if let Some(node) = self.table.find(key) {
            self.unlink_recency(node);
            self.table.remove(key);
            self.size -= 1;
            unsafe {
                drop(Box::from_raw(node));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn push_front(&mut self, node: *mut Node<K, V>) {
        unsafe {
            (*node).prev = ptr::null_mut();
            (*node).next = self.head;
            if !self.head.is_null() {
                (*self.head).prev = node;
            }
        }
        self.head = node;
        if self.tail.is_null() {
            self.tail = node;
        }
    }

    fn move_to_front(&mut self, node: *mut Node<K, V>) {
        if node == self.head {
            return;
        }
        self.unlink_recency(node);
        unsafe {
            (*node).prev = ptr::null_mut();
            (*node).next = self.head;
            if !self.head.is_null() {
                (*self.head).prev = node;
            }
        }
        self.head = node;
        if self.tail.is_null() {
            self.tail = node;
        }
    }

    /// Unlinks `node` from the recency list only (the hash table still
    /// has to be told separately — callers do that).
    fn unlink_recency(&mut self, node: *mut Node<K, V>) {
        unsafe {
            if node == self.head {
                self.head = (*node).next;
            } else {
                (*(*node).prev).next = (*node).next;
            }
            if node == self.tail {
                self.tail = (*node).prev;
            } else {
                (*(*node).next).prev = (*node).prev;
            }
        }
    }

    /// Evicts `node` from both structures and frees it. Used for
    /// capacity-triggered eviction, where the key is not already known
    /// to the caller.
    fn drop_node(&mut self, node: *mut Node<K, V>) {
        self.unlink_recency(node);
        let key = unsafe { &(*node).key };
        self.table.remove(key);
        self.size -= 1;
        unsafe {
            drop(Box::from_raw(node));
        }
    }
}

impl<K, V> Drop for LruCache<K, V> {
    fn drop(&mut self) {
        let mut current = self.head;
        while !current.is_null() {
            let next = unsafe { (*current).next };
            unsafe {
                drop(Box::from_raw(current));
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests;
