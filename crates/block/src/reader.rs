use crate::varint::{decode_varint32, read_varint32_from};
use crate::BlockError;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Opens a persisted block by path. Holds no writable handle; every
/// `get` opens the file fresh and closes it before returning, per the
/// resource policy of the engine this block format serves.
pub struct BlockReader {
    path: PathBuf,
}

impl BlockReader {
    /// Validates the file is at least large enough to hold a trailer.
    /// Does not keep the handle open.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BlockError> {
        let path = path.into();
        let len = File::open(&path)?.metadata()?.len();
        if len < 4 {
            return Err(BlockError::CorruptedBlock(
                "block shorter than the trailer's restart count".into(),
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Binary-searches the restart table, then linearly scans the
    /// matching restart group.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BlockError> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();

        file.seek(SeekFrom::End(-4))?;
        let mut count_bytes = [0u8; 4];
        file.read_exact(&mut count_bytes)?;
        let m = u32::from_le_bytes(count_bytes) as usize;
        if m == 0 {
            return Err(BlockError::CorruptedBlock("restart count is zero".into()));
        }

        let restarts_len = (m as u64) * 4;
        if len < 4 + restarts_len {
            return Err(BlockError::CorruptedBlock(
                "block shorter than its own restart table".into(),
            ));
        }
        file.seek(SeekFrom::End(-(4 + restarts_len as i64)))?;
        let mut restart_bytes = vec![0u8; restarts_len as usize];
        file.read_exact(&mut restart_bytes)?;
        let restarts: Vec<u32> = restart_bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect();

        let entries_end = (len - 4 - restarts_len) as u32;

        let mut l = 0usize;
        let mut r = m - 1;
        while l < r {
            let mid = (l + r + 1) / 2;
            let candidate = self.read_restart_key(&mut file, restarts[mid])?;
            if candidate.as_slice() <= key {
                l = mid;
            } else {
                r = mid - 1;
            }
        }

        let group_start = restarts[l];
        let group_end = if l + 1 < m { restarts[l + 1] } else { entries_end };
        self.scan_group(&mut file, group_start, group_end, key)
    }

    /// Reads just the full key stored at a restart point (where
    /// `shared == 0` by construction), without decoding the rest of the
    /// entry. Used only by the binary search.
    fn read_restart_key(&self, file: &mut File, offset: u32) -> Result<Vec<u8>, BlockError> {
        file.seek(SeekFrom::Start(offset as u64))?;
        let shared = read_varint32_from(file)?;
        if shared != 0 {
            return Err(BlockError::CorruptedBlock(
                "restart group head must have shared == 0".into(),
            ));
        }
        let unshared = read_varint32_from(file)?;
        let mut key = vec![0u8; unshared as usize];
        file.read_exact(&mut key)?;
        Ok(key)
    }

    fn scan_group(
        &self,
        file: &mut File,
        start: u32,
        end: u32,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, BlockError> {
        if end < start {
            return Err(BlockError::CorruptedBlock("restart offsets out of order".into()));
        }
        file.seek(SeekFrom::Start(start as u64))?;
        let mut buf = vec![0u8; (end - start) as usize];
        file.read_exact(&mut buf)?;

        let mut pos = 0usize;
        let mut last_key: Vec<u8> = Vec::new();
        while pos < buf.len() {
            let (shared, n) = decode_varint32(&buf[pos..])?;
            pos += n;
            let (unshared, n) = decode_varint32(&buf[pos..])?;
            pos += n;
            let (shared, unshared) = (shared as usize, unshared as usize);

            let unshared_bytes = buf
                .get(pos..pos + unshared)
                .ok_or_else(|| BlockError::CorruptedBlock("truncated key bytes".into()))?;
            let mut current_key = last_key
                .get(..shared)
                .ok_or_else(|| BlockError::CorruptedBlock("shared prefix longer than last key".into()))?
                .to_vec();
            current_key.extend_from_slice(unshared_bytes);
            pos += unshared;

            let (value_len, n) = decode_varint32(&buf[pos..])?;
            pos += n;
            let value_len = value_len as usize;
            let value = buf
                .get(pos..pos + value_len)
                .ok_or_else(|| BlockError::CorruptedBlock("truncated value bytes".into()))?
                .to_vec();
            pos += value_len;

            if current_key == key {
                return Ok(Some(value));
            }
            last_key = current_key;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockBuilder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_block(bytes: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn scenario_s5_block_format_and_lookup() {
        let mut builder = BlockBuilder::new(4);
        let keys = [
            "0", "1", "10", "11", "12", "13", "14", "15", "16", "17", "18", "19", "2", "3", "4",
            "5", "6", "7", "8", "9",
        ];
        for k in keys {
            builder.add(k.as_bytes(), k.as_bytes());
        }
        let bytes = builder.finish();
        let file = write_block(&bytes);
        let reader = BlockReader::open(file.path()).unwrap();

        assert_eq!(reader.get(b"4").unwrap().unwrap(), b"4");
        assert!(reader.get(b"zzz").unwrap().is_none());
        for k in keys {
            assert_eq!(reader.get(k.as_bytes()).unwrap().unwrap(), k.as_bytes());
        }
    }

    #[test]
    fn single_restart_group_skips_binary_search() {
        let mut builder = BlockBuilder::new(4);
        builder.add(b"a", b"1");
        builder.add(b"b", b"2");
        let bytes = builder.finish();
        let file = write_block(&bytes);
        let reader = BlockReader::open(file.path()).unwrap();
        assert_eq!(reader.get(b"a").unwrap().unwrap(), b"1");
        assert_eq!(reader.get(b"b").unwrap().unwrap(), b"2");
        assert!(reader.get(b"c").unwrap().is_none());
    }

    #[test]
    fn key_below_first_restart_is_a_clean_miss() {
        let mut builder = BlockBuilder::new(4);
        builder.add(b"m", b"1");
        builder.add(b"z", b"2");
        let bytes = builder.finish();
        let file = write_block(&bytes);
        let reader = BlockReader::open(file.path()).unwrap();
        assert!(reader.get(b"a").unwrap().is_none());
    }

    #[test]
    fn truncated_trailer_is_corrupted_block() {
        let file = write_block(&[1, 2, 3]);
        assert!(BlockReader::open(file.path()).is_err());
    }

    #[test]
    fn empty_sorted_unique_pairs_round_trip() {
        let mut builder = BlockBuilder::new(4);
        let pairs: Vec<(String, String)> =
            (0..37).map(|i| (format!("k{:03}", i), format!("v{:03}", i))).collect();
        for (k, v) in &pairs {
            builder.add(k.as_bytes(), v.as_bytes());
        }
        let bytes = builder.finish();
        let file = write_block(&bytes);
        let reader = BlockReader::open(file.path()).unwrap();
        for (k, v) in &pairs {
            assert_eq!(reader.get(k.as_bytes()).unwrap().unwrap(), v.as_bytes());
        }
        assert!(reader.get(b"nope").unwrap().is_none());
    }
}
