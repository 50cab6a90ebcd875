use crate::varint::{encode_varint32, write_fixed32_le};

/// Buffers records into a prefix-compressed block with periodic restart
/// points. Restart groups bound the worst-case linear scan a reader needs
/// to do after binary search to `O(restart_interval)` entries.
pub struct BlockBuilder {
    restart_interval: usize,
    buffer: Vec<u8>,
    restarts: Vec<u32>,
    last_key: Vec<u8>,
    entries_since_restart: usize,
}

impl BlockBuilder {
    pub fn new(restart_interval: usize) -> Self {
        assert!(restart_interval >= 1, "restart_interval must be >= 1");
        let mut builder = Self {
            restart_interval,
            buffer: Vec::new(),
            restarts: Vec::new(),
            last_key: Vec::new(),
            entries_since_restart: 0,
        };
        builder.restarts.push(0);
        builder
    }

    /// Empties the buffer and starts a fresh block, seeding restart 0.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.restarts.clear();
        self.restarts.push(0);
        self.last_key.clear();
        self.entries_since_restart = 0;
    }

    /// Appends `(key, value)`. `key` MUST be strictly greater than the key
    /// of the previous call since the last `reset`/construction — this is
    /// upheld by every caller in this workspace, which always flushes a
    /// write buffer in ascending key order, so it is a debug assertion
    /// rather than a recoverable error.
    pub fn add(&mut self, key: &[u8], value: &[u8]) {
        debug_assert!(
            self.entries_since_restart == 0 || key > self.last_key.as_slice(),
            "keys must be added in strictly increasing order"
        );

        let shared = if self.entries_since_restart == self.restart_interval {
            self.restarts.push(self.buffer.len() as u32);
            self.entries_since_restart = 0;
            0
        } else {
            common_prefix_len(key, &self.last_key)
        };

        let unshared = key.len() - shared;
        encode_varint32(shared as u32, &mut self.buffer);
        encode_varint32(unshared as u32, &mut self.buffer);
        self.buffer.extend_from_slice(&key[shared..]);
        encode_varint32(value.len() as u32, &mut self.buffer);
        self.buffer.extend_from_slice(value);

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        self.entries_since_restart += 1;
    }

    /// Returns the number of entries appended since the last restart/reset
    /// (used by tests and by callers who want to flush on a size budget
    /// rather than a fixed entry count).
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Emits the restart-offset trailer and returns the finished bytes.
    /// The builder is left in an unspecified state until `reset`.
    pub fn finish(&mut self) -> Vec<u8> {
        let mut out = std::mem::take(&mut self.buffer);
        let m = self.restarts.len() as u32;
        for &offset in &self.restarts {
            write_fixed32_le(offset, &mut out);
        }
        write_fixed32_le(m, &mut out);
        out
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
