// Variable-length integers for the payload's frequency table.
//
// Base-128, big-endian: most-significant group first.
// Each byte has bit 7 set except the final byte.
// Signed values go through a zigzag mapping first so that small magnitudes
// of either sign stay short.

use std::io::{self, Write};

use thiserror::Error;

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

/// Overflow guard for the 64-bit accumulator: if these bits are set before a
/// shift, the next `<< 7` would overflow.
const U64_OVERFLOW_MASK: u64 = 0xFE00_0000_0000_0000;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` into `buf`, right-aligned.
/// Returns the number of bytes written (1..=10); the encoding is
/// `buf[MAX_VARINT_LEN - len..]`.
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = MAX_VARINT_LEN;
    loop {
        i -= 1;
        buf[i] = (num as u8 & 0x7F) | 0x80;
        num >>= 7;
        if num == 0 {
            break;
        }
    }
    buf[MAX_VARINT_LEN - 1] &= 0x7F; // clear MSB on last byte
    MAX_VARINT_LEN - i
}

/// Encode a `u64` and write to a `Write` sink.
pub fn write_u64<W: Write>(w: &mut W, num: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    w.write_all(&buf[MAX_VARINT_LEN - len..])
}

/// Zigzag-map an `i64` and write it as a varint.
pub fn write_i64<W: Write>(w: &mut W, num: i64) -> io::Result<()> {
    write_u64(w, zigzag_encode(num))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `u64` from the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut val: u64 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if val & U64_OVERFLOW_MASK != 0 {
            return Err(VarIntError::Overflow);
        }
        val = (val << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((val, i + 1));
        }
    }
    Err(VarIntError::Underflow)
}

/// Decode a zigzag-mapped `i64` from the front of `data`.
pub fn read_i64(data: &[u8]) -> Result<(i64, usize), VarIntError> {
    let (raw, len) = read_u64(data)?;
    Ok((zigzag_decode(raw), len))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map signed to unsigned: 0, -1, 1, -2, 2 ... -> 0, 1, 2, 3, 4 ...
#[inline]
pub fn zigzag_encode(num: i64) -> u64 {
    ((num << 1) ^ (num >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(num: u64) -> i64 {
    ((num >> 1) as i64) ^ -((num & 1) as i64)
}

/// Return the encoded byte-length of a `u64` value.
#[inline]
pub fn sizeof_u64(num: u64) -> usize {
    let bits = 64 - num.leading_zeros();
    (bits.max(1).div_ceil(7) as usize).min(MAX_VARINT_LEN)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarIntError {
    /// Not enough input bytes to complete the integer.
    #[error("varint underflow (truncated input)")]
    Underflow,
    /// Value would overflow the target integer type.
    #[error("varint overflow")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
