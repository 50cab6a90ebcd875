//! LSB-first 7-bit-group varint and 4-byte little-endian fixed-width
//! codecs. Both are used throughout the on-disk block format and MUST
//! stay bit-compatible between [`crate::BlockBuilder`] and
//! [`crate::BlockReader`].

use crate::BlockError;
use std::io::Read;

const MAX_VARINT_BYTES: usize = 5;

/// Appends the varint encoding of `value` to `out`. 1–5 bytes.
pub fn encode_varint32(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
            out.push(byte);
        } else {
            out.push(byte);
            break;
        }
    }
}

/// Decodes a varint from the start of `buf`, returning the decoded value
/// and the number of bytes consumed.
pub fn decode_varint32(buf: &[u8]) -> Result<(u32, usize), BlockError> {
    let mut result: u32 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let byte = *buf
            .get(i)
            .ok_or_else(|| BlockError::CorruptedBlock("varint ran past end of buffer".into()))?;
        if i == MAX_VARINT_BYTES - 1 && byte & 0x80 != 0 {
            return Err(BlockError::CorruptedBlock(
                "varint continuation bit set past 5th byte".into(),
            ));
        }
        result |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }
    unreachable!("loop always returns or errors within MAX_VARINT_BYTES iterations")
}

/// Reads one varint directly from a `Read` stream, one byte at a time.
/// Used by the reader's binary search, which only ever needs to peek a
/// handful of keys rather than decode a whole restart group.
pub fn read_varint32_from<R: Read>(reader: &mut R) -> Result<u32, BlockError> {
    let mut result: u32 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        let byte = byte[0];
        if i == MAX_VARINT_BYTES - 1 && byte & 0x80 != 0 {
            return Err(BlockError::CorruptedBlock(
                "varint continuation bit set past 5th byte".into(),
            ));
        }
        result |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    unreachable!("loop always returns or errors within MAX_VARINT_BYTES iterations")
}

pub fn write_fixed32_le(value: u32, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn read_fixed32_le(buf: &[u8]) -> Result<u32, BlockError> {
    let bytes: [u8; 4] = buf
        .get(..4)
        .ok_or_else(|| BlockError::CorruptedBlock("short fixed32 read".into()))?
        .try_into()
        .unwrap();
    Ok(u32::from_le_bytes(bytes))
}
