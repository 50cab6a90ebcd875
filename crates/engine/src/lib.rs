//! # Engine - RiptideKV Storage Core
//!
//! The central façade tying [`lru_cache`], [`memtable`], and [`sstable`]
//! together into the embedded LSM-tree storage core.
//!
//! ## Architecture
//!
//! ```text
//! Insert/Get/Remove
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │  lru_cache::LruCache   (hottest reads)        │
//! │       |  miss                                  │
//! │       v                                        │
//! │  mutable_buffer: memtable::WriteBuffer         │
//! │       |  miss           (ApproxSize() > S?)    │
//! │       |                       yes               │
//! │       v                       v                 │
//! │  frozen_buffer (optional) → FreezeAndFlush     │
//! │       |  miss                                  │
//! │       v                                        │
//! │  sstable::FileStack     (newest file first)    │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! There is no write-ahead log and no cross-level compaction: the only
//! durability boundary is a successful flush to the file stack, and the
//! only recovery path is `sstable::FileStack::open`'s directory rescan.
mod record_cache;

use std::path::Path;
use std::sync::Arc;

use config::EngineConfig;
use memtable::{KVRecord, MemtableError, WriteBuffer};
use sstable::{FileStack, SstableError};
use thiserror::Error;

use record_cache::RecordCache;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Memtable(#[from] MemtableError),
    #[error(transparent)]
    Sstable(#[from] SstableError),
}

/// The embedded storage core: one mutable write buffer, at most one
/// frozen write buffer awaiting flush, a persisted file stack, and an
/// LRU cache of recently touched records.
pub struct Engine {
    cache: RecordCache,
    mutable_buffer: WriteBuffer,
    frozen_buffer: Option<WriteBuffer>,
    file_stack: FileStack,
    flush_threshold_bytes: usize,
    restart_interval: usize,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("mutable_size", &self.mutable_buffer.approx_size())
            .field("has_frozen_buffer", &self.frozen_buffer.is_some())
            .field("sstable_count", &self.file_stack.len())
            .field("flush_threshold_bytes", &self.flush_threshold_bytes)
            .finish()
    }
}

impl Engine {
    /// Opens (or creates) the file stack at `config.sst_dir` and starts a
    /// fresh mutable write buffer. There is no WAL to replay; any record
    /// not yet flushed when the previous engine was dropped is lost,
    /// except for the best-effort flush [`Engine`]'s [`Drop`] impl
    /// performs.
    pub fn open<P: AsRef<Path>>(config: &EngineConfig, override_dir: Option<P>) -> Result<Self, EngineError> {
        let dir = override_dir
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| config.sst_dir.clone());
        let file_stack = FileStack::open(&dir, &config.sst_prefix)?;
        Ok(Self {
            cache: RecordCache::new(config.cache_capacity),
            mutable_buffer: WriteBuffer::new(),
            frozen_buffer: None,
            file_stack,
            flush_threshold_bytes: config.memtable_flush_threshold_bytes,
            restart_interval: config.restart_interval,
        })
    }

    /// Inserts or overwrites `key` with `value`. Invalidates any cached
    /// entry for `key`, writes a LIVE record into the mutable buffer, and
    /// triggers a freeze+flush if the buffer has grown past the
    /// configured threshold.
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), EngineError> {
        self.cache.remove(&key);
        self.mutable_buffer.insert(KVRecord::live(key, value))?;
        if self.mutable_buffer.approx_size() > self.flush_threshold_bytes {
            self.freeze_and_flush()?;
        }
        Ok(())
    }

    /// Looks up `key`, checking the cache, then the mutable buffer, then
    /// the frozen buffer (if any), then the file stack newest-first.
    /// Returns `None` for a miss in every layer or a live TOMBSTONE hit.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        if let Some(record) = self.cache.get(key) {
            if record.is_live() {
                return Ok(Some(record.value.clone()));
            }
            return Ok(None);
        }

        if let Some(record) = self.mutable_buffer.get_entry(key) {
            return Ok(self.resolve_and_cache(record));
        }

        if let Some(buffer) = &self.frozen_buffer {
            if let Some(record) = buffer.get_entry(key) {
                return Ok(self.resolve_and_cache(record));
            }
        }

        if let Some(value) = self.file_stack.get(key)? {
            let record = Arc::new(KVRecord::live(key.to_vec(), value));
            self.cache.insert(key.to_vec(), Arc::clone(&record));
            return Ok(Some(record.value.clone()));
        }

        Ok(None)
    }

    fn resolve_and_cache(&mut self, record: Arc<KVRecord>) -> Option<Vec<u8>> {
        if !record.is_live() {
            return None;
        }
        let value = record.value.clone();
        self.cache.insert(record.key.clone(), record);
        Some(value)
    }

    /// Writes a TOMBSTONE for `key`, invalidating any cached entry first.
    pub fn remove(&mut self, key: Vec<u8>) -> Result<(), EngineError> {
        self.cache.remove(&key);
        self.mutable_buffer.insert(KVRecord::tombstone(key))?;
        Ok(())
    }

    /// Freezes the mutable buffer, flushes it to a new file, and starts a
    /// fresh mutable buffer. No-op if the mutable buffer is empty.
    ///
    /// A previous call may have frozen a buffer and then failed to flush
    /// it (`FlushFailed`/`Io`, e.g. disk full or a permission error during
    /// the file stack's write); per spec §4.F that frozen buffer is
    /// retained rather than discarded, and the engine must keep retrying
    /// it rather than freezing a new buffer on top of it, which would
    /// silently drop the still-unflushed records. So a pending frozen
    /// buffer is always flushed first; only once it is gone does this
    /// freeze a new one from `mutable_buffer`.
    pub fn freeze_and_flush(&mut self) -> Result<(), EngineError> {
        if self.frozen_buffer.is_some() {
            let pending = self.frozen_buffer.as_ref().expect("checked above");
            self.file_stack.push_from_buffer(pending, self.restart_interval)?;
            log::debug!("flushed previously pending write buffer to disk");
            self.frozen_buffer = None;
        }

        if self.mutable_buffer.is_empty() {
            return Ok(());
        }
        self.mutable_buffer.freeze();
        let flushing = std::mem::replace(&mut self.mutable_buffer, WriteBuffer::new());
        self.frozen_buffer = Some(flushing);

        let buffer = self.frozen_buffer.as_ref().expect("just assigned");
        self.file_stack.push_from_buffer(buffer, self.restart_interval)?;
        log::debug!("flushed write buffer to disk");
        self.frozen_buffer = None;
        Ok(())
    }

    /// Flushes any unwritten data. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.mutable_buffer.approx_size() > 0 {
            self.freeze_and_flush()?;
        }
        Ok(())
    }

    /// Number of records currently resident in the mutable write buffer.
    pub fn mutable_buffer_is_empty(&self) -> bool {
        self.mutable_buffer.is_empty()
    }

    /// Number of persisted files in the file stack.
    pub fn sstable_count(&self) -> usize {
        self.file_stack.len()
    }
}

/// Best-effort flush on drop: there is no WAL to fall back on, so any
/// data left in the mutable buffer when the engine is dropped without an
/// explicit `shutdown()` is flushed here; a failure is only logged since
/// `Drop` cannot propagate errors.
impl Drop for Engine {
    fn drop(&mut self) {
        if self.mutable_buffer.approx_size() > 0 {
            if let Err(err) = self.freeze_and_flush() {
                log::warn!("engine drop: failed to flush mutable buffer: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests;
