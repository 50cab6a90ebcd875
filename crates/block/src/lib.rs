//! The prefix-compressed, restart-pointed block format: the on-disk unit
//! this engine persists one of per file.
//!
//! ```text
//! block      := entries trailer
//! entries    := entry*
//! entry      := varint(shared) varint(unshared) unshared_key_bytes
//!               varint(value_len) value_bytes
//! trailer    := fixed32(restart_offset)^M  fixed32(M)
//! ```
//!
//! Restart groups (size `R`, configurable, reference value 4) bound a
//! point lookup's worst-case linear scan: [`BlockReader::get`] binary
//! searches the restart table for the rightmost restart key `<= target`,
//! then decodes at most one group's worth of entries.

mod builder;
mod reader;
pub mod varint;

pub use builder::BlockBuilder;
pub use reader::BlockReader;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("corrupted block: {0}")]
    CorruptedBlock(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
