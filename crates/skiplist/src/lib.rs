//! A concurrent ordered index: a multi-level probabilistic linked
//! structure supporting a single writer and many concurrent readers
//! without readers ever taking a lock.
//!
//! Each node owns an inline tower of atomic forward pointers sized to a
//! height chosen at insert time (`h = 1` with probability `(p-1)/p`, each
//! additional level with probability `1/p`). Lookups descend from the
//! current max height, advancing at each level while `next.key <= target`;
//! landing on the rightmost node among same-key duplicates is what lets
//! `get` observe the most recently inserted record for a key.
//!
//! Level-link publication uses release-store / acquire-load so a reader
//! that observes a new node at level `L` also observes that node's own
//! forward pointers 0..L-1. Height bumps are relaxed: a reader seeing a
//! stale max height still reaches every node through the lower levels.
//!
//! Inserts are **not** safe to call concurrently with each other — only
//! one writer at a time, many readers any time. Callers serialize writes
//! externally (the engine façade does this with a single mutex).

mod record;

pub use record::{KVRecord, RecordKind};

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::Arc;

pub const H_MAX: usize = 12;
const BRANCHING: u64 = 4;

struct Node {
    record: Arc<KVRecord>,
    next: Box<[AtomicPtr<Node>]>,
}

/// Small, deterministic PRNG so height selection is reproducible across
/// runs (tests assert on shapes that depend on it). Seeded the same way
/// the reference engine seeds its generator.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed | 1,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn one_in(&mut self, n: u64) -> bool {
        self.next_u64() % n == 0
    }
}

pub struct SkipList {
    head: Box<[AtomicPtr<Node>]>,
    max_height: AtomicUsize,
    rng: UnsafeCell<Xorshift64>,
}

// SAFETY: `rng` is only ever touched from `insert`, and the single-writer
// contract documented on `insert` means at most one thread mutates it at
// a time. All other fields are plain atomics, safe to share.
unsafe impl Sync for SkipList {}

impl SkipList {
    pub fn new() -> Self {
        Self::with_seed(0xdead_beef)
    }

    pub fn with_seed(seed: u64) -> Self {
        let head = (0..H_MAX)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();
        Self {
            head,
            max_height: AtomicUsize::new(1),
            rng: UnsafeCell::new(Xorshift64::new(seed)),
        }
    }

    fn next_at(&self, node: *mut Node, level: usize, ordering: Ordering) -> *mut Node {
        if node.is_null() {
            self.head[level].load(ordering)
        } else {
            unsafe { (*node).next[level].load(ordering) }
        }
    }

    fn set_next(&self, node: *mut Node, level: usize, target: *mut Node, ordering: Ordering) {
        if node.is_null() {
            self.head[level].store(target, ordering);
        } else {
            unsafe { (*node).next[level].store(target, ordering) }
        }
    }

    /// Descends from the current max height to level 0, advancing at each
    /// level while `next.key <= key`. Returns the last node visited (a
    /// null pointer means "before the first node", i.e. the head). When
    /// `prev` is supplied, `prev[level]` is set to the node the search sat
    /// on at that level just before dropping down — exactly what `insert`
    /// needs to splice a new node in.
    fn find_last_le(&self, key: &[u8], mut prev: Option<&mut [*mut Node; H_MAX]>) -> *mut Node {
        let mut now: *mut Node = ptr::null_mut();
        let mut level = self.max_height.load(Ordering::Relaxed);
        while level > 0 {
            level -= 1;
            let mut next = self.next_at(now, level, Ordering::Acquire);
            while !next.is_null() && unsafe { (*next).record.key.as_slice() } <= key {
                now = next;
                next = self.next_at(now, level, Ordering::Acquire);
            }
            if let Some(p) = prev.as_deref_mut() {
                p[level] = now;
            }
        }
        now
    }

    fn random_height(&self) -> usize {
        // SAFETY: single-writer contract on `insert`.
        let rng = unsafe { &mut *self.rng.get() };
        let mut height = 1;
        while height < H_MAX && rng.one_in(BRANCHING) {
            height += 1;
        }
        height
    }

    /// Places `record` in sorted position. Duplicate keys coexist; a new
    /// insert for an existing key is always spliced in after the rightmost
    /// existing node with that key, so `get` (which also lands on the
    /// rightmost match) observes the newest write.
    ///
    /// Not safe to call from more than one thread at a time.
    pub fn insert(&self, record: Arc<KVRecord>) {
        let mut prev: [*mut Node; H_MAX] = [ptr::null_mut(); H_MAX];
        self.find_last_le(&record.key, Some(&mut prev));

        let height = self.random_height();
        let max_height = self.max_height.load(Ordering::Relaxed);
        if height > max_height {
            for slot in prev.iter_mut().take(H_MAX).skip(max_height) {
                *slot = ptr::null_mut();
            }
            self.max_height.store(height, Ordering::Relaxed);
        }

        let next_slots: Box<[AtomicPtr<Node>]> = (0..height)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();
        let node = Box::into_raw(Box::new(Node {
            record,
            next: next_slots,
        }));

        for level in 0..height {
            let before = prev[level];
            let successor = self.next_at(before, level, Ordering::Relaxed);
            unsafe {
                (*node).next[level].store(successor, Ordering::Relaxed);
            }
            self.set_next(before, level, node, Ordering::Release);
        }
    }

    /// Returns the record for `key` if it exists and is `Live`. A
    /// `Tombstone` hit or no match at all both return `None`.
    pub fn get(&self, key: &[u8]) -> Option<Arc<KVRecord>> {
        self.get_entry(key).filter(|r| r.is_live())
    }

    /// Like [`get`](Self::get) but also returns tombstones, so a caller can
    /// tell "deleted" apart from "never written".
    pub fn get_entry(&self, key: &[u8]) -> Option<Arc<KVRecord>> {
        let now = self.find_last_le(key, None);
        if now.is_null() {
            return None;
        }
        let record = unsafe { &(*now).record };
        if record.key.as_slice() != key {
            return None;
        }
        Some(Arc::clone(record))
    }

    /// Forward-only, non-restartable iteration in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.head[0].load(Ordering::Acquire),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head[0].load(Ordering::Acquire).is_null()
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SkipList {
    fn drop(&mut self) {
        let mut current = self.head[0].load(Ordering::Relaxed);
        while !current.is_null() {
            let node = unsafe { Box::from_raw(current) };
            current = node.next[0].load(Ordering::Relaxed);
        }
    }
}

pub struct Iter<'a> {
    list: &'a SkipList,
    current: *mut Node,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Arc<KVRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_null() {
            return None;
        }
        let record = unsafe { Arc::clone(&(*self.current).record) };
        self.current = self.list.next_at(self.current, 0, Ordering::Acquire);
        Some(record)
    }
}

#[cfg(test)]
mod tests;
