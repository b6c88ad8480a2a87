use bytes::{BufMut, BytesMut};
use num_bigint::BigInt;

use crate::error::{MarshalError, Result};
use crate::marker::{
    BIG_DECIMAL, BIG_INLINE_MAX, BIG_INLINE_OFFSET, BIG_INT, BIG_LONG, BIG_SHORT, INT_FULL,
    INT_SHORT, LONG_FULL, LONG_INT, LONG_SHORT, STRING_INDEX,
};

/// Default largest declared length accepted while reading: 16 MiB.
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// Default capacity of a context's internal buffer: 8 KiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Default number of buffered bytes that forces a write to the sink: 8 KiB.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 8 * 1024;

/// Largest length that a compact int prefix can carry.
pub const MAX_ENCODED_LENGTH: usize = i32::MAX as usize;

/// Encode a compact int.
///
/// ```text
/// 0 <= v < 254      v                      (1 byte)
/// i16 range         0xFE, v as i16 BE      (3 bytes)
/// otherwise         0xFF, v as i32 BE      (5 bytes)
/// ```
pub fn encode_compact_int(value: i32, dst: &mut BytesMut) {
    if (0..i32::from(INT_SHORT)).contains(&value) {
        dst.put_u8(value as u8);
    } else if let Ok(short) = i16::try_from(value) {
        dst.put_u8(INT_SHORT);
        dst.put_i16(short);
    } else {
        dst.put_u8(INT_FULL);
        dst.put_i32(value);
    }
}

/// Encode a compact long.
///
/// ```text
/// 0 <= v < 253      v                      (1 byte)
/// i16 range         0xFD, v as i16 BE      (3 bytes)
/// i32 range         0xFE, v as i32 BE      (5 bytes)
/// otherwise         0xFF, v as i64 BE      (9 bytes)
/// ```
pub fn encode_compact_long(value: i64, dst: &mut BytesMut) {
    if (0..i64::from(LONG_SHORT)).contains(&value) {
        dst.put_u8(value as u8);
    } else if let Ok(short) = i16::try_from(value) {
        dst.put_u8(LONG_SHORT);
        dst.put_i16(short);
    } else if let Ok(int) = i32::try_from(value) {
        dst.put_u8(LONG_INT);
        dst.put_i32(int);
    } else {
        dst.put_u8(LONG_FULL);
        dst.put_i64(value);
    }
}

/// Encode a big integer, choosing the narrowest representation.
///
/// Values in `0..=251` are folded into the selector byte as `4 + v`; the
/// selector therefore spans the whole unsigned byte range and must be read
/// back as unsigned.
pub fn encode_big_integer(value: &BigInt, dst: &mut BytesMut) -> Result<()> {
    if let Ok(short) = i16::try_from(value) {
        if (0..=BIG_INLINE_MAX).contains(&short) {
            dst.put_u8(BIG_INLINE_OFFSET + short as u8);
        } else {
            dst.put_u8(BIG_SHORT);
            dst.put_i16(short);
        }
    } else if let Ok(int) = i32::try_from(value) {
        dst.put_u8(BIG_INT);
        dst.put_i32(int);
    } else if let Ok(long) = i64::try_from(value) {
        dst.put_u8(BIG_LONG);
        dst.put_i64(long);
    } else {
        dst.put_u8(BIG_DECIMAL);
        encode_length_and_bytes(value.to_str_radix(10).as_bytes(), dst)?;
    }
    Ok(())
}

/// Value carried inline by a big integer selector in `4..=255`.
pub fn inline_big_integer(selector: u8) -> i16 {
    i16::from(selector) - i16::from(BIG_INLINE_OFFSET)
}

/// Encode a length as a compact int.
pub fn encode_length(len: usize, dst: &mut BytesMut) -> Result<()> {
    let len = i32::try_from(len).map_err(|_| MarshalError::LengthTooLarge {
        size: len,
        max: MAX_ENCODED_LENGTH,
    })?;
    encode_compact_int(len, dst);
    Ok(())
}

/// Encode a compact-int length followed by the raw bytes.
pub fn encode_length_and_bytes(bytes: &[u8], dst: &mut BytesMut) -> Result<()> {
    encode_length(bytes.len(), dst)?;
    dst.put_slice(bytes);
    Ok(())
}

/// Encode a back-reference to an already shared string.
///
/// ```text
/// index < 254       index                  (1 byte)
/// otherwise         0xFE, index as i32 BE  (5 bytes)
/// ```
pub fn encode_string_reference(index: i32, dst: &mut BytesMut) {
    if (0..i32::from(STRING_INDEX)).contains(&index) {
        dst.put_u8(index as u8);
    } else {
        dst.put_u8(STRING_INDEX);
        dst.put_i32(index);
    }
}

/// Configuration shared by writing and reading contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// Largest declared length accepted while reading. Default: 16 MiB.
    pub max_length: usize,
    /// Initial capacity of the internal buffer. Default: 8 KiB.
    pub buffer_capacity: usize,
    /// Buffered bytes that force a write to the sink. Default: 8 KiB.
    pub flush_threshold: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}
