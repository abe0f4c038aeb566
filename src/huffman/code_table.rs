// Value -> prefix code mapping derived from a tree.
//
// Codes are held as (bits, len) with the code in the `len` low bits of a
// u64, first bit most significant. The "0101" text form exists for
// debugging and the CLI's `info --codes`.

use std::collections::BTreeMap;
use std::fmt;

use super::bits::{BitStream, BitWriter};
use super::frequency::FrequencyTable;
use super::tree::{HuffmanTree, Node};
use crate::error::{Error, Result};

/// Widest code the 64-bit register can hold.
pub const MAX_CODE_LEN: usize = 64;

/// One prefix code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u64,
    len: u8,
}

impl Code {
    #[inline]
    pub fn new(bits: u64, len: u8) -> Self {
        Self { bits, len }
    }

    #[inline]
    pub fn bits(&self) -> u64 {
        self.bits
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u8 {
        self.len
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            f.write_str(if (self.bits >> i) & 1 == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Code for every leaf of a [`HuffmanTree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<i64, Code>,
}

impl CodeTable {
    /// Walk the tree depth-first: `0` on the left edge, `1` on the right.
    ///
    /// A single-leaf tree gets the one-bit code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut codes = BTreeMap::new();

        if let Node::Leaf { value, .. } = *tree.node(tree.root()) {
            codes.insert(value, Code::new(0, 1));
            return Ok(Self { codes });
        }

        let mut stack: Vec<(usize, u64, usize)> = vec![(tree.root(), 0, 0)];
        while let Some((index, bits, len)) = stack.pop() {
            match *tree.node(index) {
                Node::Leaf { value, .. } => {
                    if len > MAX_CODE_LEN {
                        return Err(Error::CodeTooLong { value, len });
                    }
                    codes.insert(value, Code::new(bits, len as u8));
                }
                Node::Internal { left, right, .. } => {
                    stack.push((right, (bits << 1) | 1, len + 1));
                    stack.push((left, bits << 1, len + 1));
                }
            }
        }

        let table = Self { codes };
        if log::log_enabled!(log::Level::Trace) {
            for (value, code) in table.iter() {
                log::trace!("code {value} -> {code}");
            }
        }
        Ok(table)
    }

    pub fn get(&self, value: i64) -> Option<Code> {
        self.codes.get(&value).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, Code)> + '_ {
        self.codes.iter().map(|(&v, &c)| (v, c))
    }

    /// Longest code length.
    pub fn max_len(&self) -> u8 {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// Bits needed to encode a stream with these frequencies:
    /// the sum of `count * code length`.
    pub fn encoded_bits(&self, freq: &FrequencyTable) -> Result<u64> {
        let mut total: u64 = 0;
        for (value, count) in freq.iter() {
            let code = self.get(value).ok_or(Error::MissingCode { value })?;
            total = count
                .checked_mul(u64::from(code.len()))
                .and_then(|bits| total.checked_add(bits))
                .ok_or_else(|| Error::malformed("encoded bit count overflows u64"))?;
        }
        Ok(total)
    }

    /// Pack the codes of `values` MSB-first.
    ///
    /// Every value must have a code: the table has to be built from the
    /// stream being encoded.
    pub fn encode(&self, values: &[i64]) -> Result<BitStream> {
        let mut w = BitWriter::with_capacity(values.len() as u64 * u64::from(self.max_len()));
        for &value in values {
            let code = self.get(value).ok_or(Error::MissingCode { value })?;
            w.push_code(code);
        }
        Ok(w.finish())
    }
}
