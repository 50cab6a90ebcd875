//! # Memtable
//!
//! The write buffer: an ordered in-memory index ([`skiplist::SkipList`])
//! plus an approximate byte-size counter and a one-way `frozen` latch.
//!
//! A buffer accepts writes until it is frozen, at which point it becomes a
//! stable, read-only snapshot destined for a single flush to disk. The
//! engine façade holds at most one frozen buffer at a time.
//!
//! ## Example
//! ```rust
//! use memtable::{KVRecord, WriteBuffer};
//!
//! let buf = WriteBuffer::new();
//! buf.insert(KVRecord::live(b"hello".to_vec(), b"world".to_vec())).unwrap();
//! assert_eq!(buf.get(b"hello").unwrap().value, b"world".to_vec());
//!
//! buf.insert(KVRecord::tombstone(b"hello".to_vec())).unwrap();
//! assert!(buf.get(b"hello").is_none());
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub use skiplist::{KVRecord, RecordKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemtableError {
    #[error("attempted to write into a frozen write buffer")]
    FrozenBufferWrite,
}

/// Fixed per-record overhead charged against the approximate size budget,
/// independent of actual key/value length. The reference engine charges a
/// constant handle-sized estimate rather than real byte counts; exact
/// accounting is not required, only that it grows monotonically with
/// writes.
const APPROX_RECORD_OVERHEAD: usize = std::mem::size_of::<Arc<KVRecord>>();

pub struct WriteBuffer {
    index: skiplist::SkipList,
    approx_size: AtomicUsize,
    frozen: AtomicBool,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self {
            index: skiplist::SkipList::new(),
            approx_size: AtomicUsize::new(0),
            frozen: AtomicBool::new(false),
        }
    }

    /// Inserts `record`, failing if the buffer has already been frozen.
    pub fn insert(&self, record: KVRecord) -> Result<(), MemtableError> {
        if self.frozen.load(Ordering::Acquire) {
            return Err(MemtableError::FrozenBufferWrite);
        }
        self.index.insert(Arc::new(record));
        self.approx_size
            .fetch_add(APPROX_RECORD_OVERHEAD, Ordering::Relaxed);
        Ok(())
    }

    /// Returns the live value for `key`, or `None` on a miss or tombstone.
    pub fn get(&self, key: &[u8]) -> Option<Arc<KVRecord>> {
        self.index.get(key)
    }

    /// Like [`get`](Self::get), but also surfaces tombstones so a caller
    /// can distinguish "deleted" from "never written".
    pub fn get_entry(&self, key: &[u8]) -> Option<Arc<KVRecord>> {
        self.index.get_entry(key)
    }

    /// Sets the frozen latch. Idempotent.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Ascending-key iteration. Only meaningful as a stable snapshot once
    /// frozen — a buffer still accepting writes may observe new records
    /// mid-iteration.
    pub fn iter(&self) -> skiplist::Iter<'_> {
        self.index.iter()
    }

    pub fn approx_size(&self) -> usize {
        self.approx_size.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
