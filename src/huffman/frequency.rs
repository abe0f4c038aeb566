// Value -> occurrence count table, and its payload serialization.
//
// Layout: varint(symbol_count), then per symbol in ascending value order
// varint(zigzag(value)), varint(count). Ascending order doubles as the
// tree-building tie-break, so encoder and decoder rebuild the same tree.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::varint::{self, VarIntError};

/// Occurrence counts of each distinct value in a flattened stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<i64, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every value of `values`.
    pub fn from_values(values: &[i64]) -> Self {
        values.iter().copied().collect()
    }

    /// Build from explicit `(value, count)` entries; zero counts are dropped.
    pub fn from_counts<I: IntoIterator<Item = (i64, u64)>>(entries: I) -> Self {
        let mut table = Self::new();
        for (value, count) in entries {
            if count > 0 {
                *table.counts.entry(value).or_insert(0) += count;
            }
        }
        table
    }

    /// Record one occurrence of `value`.
    #[inline]
    pub fn add(&mut self, value: i64) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Count of `value` (0 if absent).
    pub fn get(&self, value: i64) -> u64 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of values counted.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.counts.iter().map(|(&v, &c)| (v, c))
    }

    /// Serialize in payload layout.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        varint::write_u64(w, self.counts.len() as u64)?;
        for (value, count) in self.iter() {
            varint::write_i64(w, value)?;
            varint::write_u64(w, count)?;
        }
        Ok(())
    }

    /// Encoded size of [`write_to`](Self::write_to) output.
    pub fn encoded_len(&self) -> usize {
        varint::sizeof_u64(self.counts.len() as u64)
            + self
                .iter()
                .map(|(v, c)| varint::sizeof_u64(varint::zigzag_encode(v)) + varint::sizeof_u64(c))
                .sum::<usize>()
    }

    /// Parse a table from the front of `data`.
    /// Returns the table and the number of bytes consumed.
    pub fn read_from(data: &[u8]) -> Result<(Self, usize)> {
        let mut pos = 0usize;
        let varint_err = |e: VarIntError, pos: usize| match e {
            VarIntError::Underflow => Error::truncated("frequency table", pos + 1, data.len()),
            VarIntError::Overflow => {
                Error::malformed(format!("frequency table: varint overflow at byte {pos}"))
            }
        };

        let (symbols, n) = varint::read_u64(data).map_err(|e| varint_err(e, pos))?;
        pos += n;
        // Each entry takes at least two bytes.
        if symbols > (data.len() - pos) as u64 / 2 {
            return Err(Error::truncated(
                "frequency table",
                pos.saturating_add((symbols as usize).saturating_mul(2)),
                data.len(),
            ));
        }

        let mut counts = BTreeMap::new();
        let mut last: Option<i64> = None;
        let mut total: u64 = 0;
        for _ in 0..symbols {
            let (value, n) = varint::read_i64(&data[pos..]).map_err(|e| varint_err(e, pos))?;
            pos += n;
            let (count, n) = varint::read_u64(&data[pos..]).map_err(|e| varint_err(e, pos))?;
            pos += n;

            if last.is_some_and(|prev| value <= prev) {
                return Err(Error::malformed(format!(
                    "frequency table: value {value} out of ascending order"
                )));
            }
            if count == 0 {
                return Err(Error::malformed(format!(
                    "frequency table: value {value} has zero count"
                )));
            }
            total = total.checked_add(count).ok_or_else(|| {
                Error::malformed("frequency table: total count overflows".to_string())
            })?;
            counts.insert(value, count);
            last = Some(value);
        }

        Ok((Self { counts }, pos))
    }
}

impl FromIterator<i64> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut table = Self::new();
        for v in iter {
            table.add(v);
        }
        table
    }
}
