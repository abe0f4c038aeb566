// MSB-first bit packing.
//
// Bit 0 of the stream is bit 7 of byte 0. The last byte is zero padded;
// `BitStream::bit_len` says how many bits are meaningful.

use super::code_table::Code;

/// Packed bits plus their exact count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    bytes: Vec<u8>,
    bit_len: u64,
}

impl BitStream {
    /// Number of bytes needed to hold `bit_len` bits.
    #[inline]
    pub fn byte_len_for(bit_len: u64) -> u64 {
        bit_len.div_ceil(8)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Meaningful bits, excluding padding.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }
}

/// Appends codes to a growing byte buffer, most significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buffer for `bits` bits.
    pub fn with_capacity(bits: u64) -> Self {
        Self {
            bytes: Vec::with_capacity(BitStream::byte_len_for(bits) as usize),
            bit_len: 0,
        }
    }

    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        let offset = (self.bit_len % 8) as u8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            // A byte was pushed above whenever offset is 0, so `last_mut` exists.
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }

    /// Append the `code.len()` low bits of `code.bits()`, high bit first.
    #[inline]
    pub fn push_code(&mut self, code: Code) {
        for i in (0..code.len()).rev() {
            self.push_bit((code.bits() >> i) & 1 == 1);
        }
    }

    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    pub fn finish(self) -> BitStream {
        BitStream {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}

/// Reads bits back in the order [`BitWriter`] wrote them.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bits consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Next bit, or `None` past the end of the buffer.
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get((self.pos / 8) as usize)?;
        let bit = byte & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_first_packing() {
        let mut w = BitWriter::new();
        w.push_code(Code::new(0b101, 3));
        w.push_code(Code::new(0b1, 1));
        w.push_code(Code::new(0b0000_1111, 8));
        let s = w.finish();
        assert_eq!(s.bit_len(), 12);
        // 1011 0000 | 1111 0000
        assert_eq!(s.as_bytes(), &[0b1011_0000, 0b1111_0000]);
    }

    #[test]
    fn trailing_byte_is_zero_padded() {
        let mut w = BitWriter::new();
        for _ in 0..9 {
            w.push_bit(true);
        }
        let s = w.finish();
        assert_eq!(s.as_bytes(), &[0xFF, 0x80]);
        assert_eq!(BitStream::byte_len_for(s.bit_len()), 2);
    }

    #[test]
    fn reader_mirrors_writer() {
        let pattern = [true, false, false, true, true, true, false, true, false, true];
        let mut w = BitWriter::with_capacity(pattern.len() as u64);
        for &b in &pattern {
            w.push_bit(b);
        }
        let s = w.finish();
        let mut r = BitReader::new(s.as_bytes());
        for &b in &pattern {
            assert_eq!(r.read_bit(), Some(b));
        }
        assert_eq!(r.position(), pattern.len() as u64);
        // Padding bits are readable but past the meaningful length.
        for _ in pattern.len()..16 {
            assert_eq!(r.read_bit(), Some(false));
        }
        assert_eq!(r.read_bit(), None);
    }

    #[test]
    fn empty_stream() {
        let s = BitWriter::new().finish();
        assert!(s.is_empty());
        assert!(s.as_bytes().is_empty());
    }
}
