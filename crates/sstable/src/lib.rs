//! # Persisted file stack
//!
//! One immutable [`block::BlockReader`]-backed file per flush, named
//! `<prefix><version_id>.sst`, held in strictly decreasing `version_id`
//! order so a point lookup can walk it newest-first and stop at the
//! first hit.
//!
//! Flushing is atomic from the file system's point of view: the block is
//! written to a temp file, fsynced, then renamed into place, so a crash
//! mid-flush never leaves a half-written `.sst` visible under its real
//! name. There is no manifest — on [`FileStack::open`], the stack is
//! rebuilt purely by scanning the directory and parsing version ids out
//! of filenames; this core has no crash-recovery story beyond that (see
//! the design notes on why this is preserved, not invented around).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SstableError {
    #[error("flush failed: {0}")]
    FlushFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Block(#[from] block::BlockError),
}

struct FileEntry {
    version_id: u64,
    #[allow(dead_code)]
    path: PathBuf,
    reader: block::BlockReader,
}

/// Newest-first stack of persisted blocks.
pub struct FileStack {
    dir: PathBuf,
    prefix: String,
    entries: Vec<FileEntry>,
    next_version: u64,
}

impl FileStack {
    /// Rebuilds the stack from whatever `<prefix>*.sst` files already
    /// exist in `dir`, newest version id first. Creates `dir` if it does
    /// not exist yet.
    pub fn open(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self, SstableError> {
        let dir = dir.into();
        let prefix = prefix.into();
        std::fs::create_dir_all(&dir)?;

        let mut versioned: Vec<(u64, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if let Some(version_id) = parse_version_id(&path, &prefix) {
                versioned.push((version_id, path));
            }
        }
        versioned.sort_by(|a, b| b.0.cmp(&a.0));

        let next_version = versioned.iter().map(|(v, _)| v + 1).max().unwrap_or(0);

        let mut entries = Vec::with_capacity(versioned.len());
        for (version_id, path) in versioned {
            let reader = block::BlockReader::open(&path)?;
            entries.push(FileEntry { version_id, path, reader });
        }

        Ok(Self { dir, prefix, entries, next_version })
    }

    /// Flushes a frozen write buffer through a fresh [`block::BlockBuilder`]
    /// into a new file, then prepends it to the stack. On any failure the
    /// stack is left exactly as it was — the caller keeps the frozen
    /// buffer around to retry later.
    ///
    /// A frozen buffer may hold several records for the same key (the
    /// index permits duplicate keys; only the rightmost is live per
    /// `skiplist`'s lookup semantics), so entries are collapsed to the
    /// last record of each run of equal keys before they reach the
    /// builder — `BlockBuilder` requires strictly increasing keys, and
    /// `BlockReader::get` returns the first match in a restart group, so
    /// feeding it two entries for one key would silently resurrect the
    /// older value on read-back.
    pub fn push_from_buffer(
        &mut self,
        buffer: &memtable::WriteBuffer,
        restart_interval: usize,
    ) -> Result<(), SstableError> {
        let version_id = self.next_version;
        self.next_version += 1;

        let file_name = format!("{}{}.sst", self.prefix, version_id);
        let final_path = self.dir.join(&file_name);
        let tmp_path = self.dir.join(format!("{file_name}.tmp"));

        let mut builder = block::BlockBuilder::new(restart_interval);
        let mut pending: Option<Arc<memtable::KVRecord>> = None;
        for record in buffer.iter() {
            if let Some(prev) = &pending {
                if prev.key != record.key {
                    add_record(&mut builder, prev);
                }
            }
            pending = Some(record);
        }
        if let Some(last) = pending {
            add_record(&mut builder, &last);
        }
        let bytes = builder.finish();

        let write_result = (|| -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&tmp_path, &final_path)?;
            if let Some(parent) = final_path.parent() {
                if let Ok(dir_handle) = File::open(parent) {
                    let _ = dir_handle.sync_all();
                }
            }
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&tmp_path);
            log::warn!("flush to {file_name} failed: {e}");
            return Err(SstableError::FlushFailed(e.to_string()));
        }

        let reader = block::BlockReader::open(&final_path)?;
        self.entries.insert(0, FileEntry { version_id, path: final_path, reader });
        log::debug!("flushed write buffer to {file_name} ({} bytes)", bytes.len());
        Ok(())
    }

    /// Walks the stack newest-first; the first hit wins.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, SstableError> {
        for entry in &self.entries {
            if let Some(value) = entry.reader.get(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version ids of the files in the stack, newest first. Exposed for
    /// tests and diagnostics.
    pub fn version_ids(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.version_id).collect()
    }
}

/// Appends a single record to `builder`, collapsing a TOMBSTONE to an
/// empty value (the on-disk format does not carry a kind tag).
fn add_record(builder: &mut block::BlockBuilder, record: &memtable::KVRecord) {
    let value: &[u8] = if record.is_live() { &record.value } else { &[] };
    builder.add(&record.key, value);
}

fn parse_version_id(path: &Path, prefix: &str) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix(prefix)?;
    let digits = rest.strip_suffix(".sst")?;
    digits.parse().ok()
}
