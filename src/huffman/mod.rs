// Static Huffman coding of signed integer streams.
//
// - `frequency`  — FrequencyTable and its payload serialization
// - `tree`       — arena HuffmanTree, deterministic build, bit-level decode
// - `code_table` — CodeTable derived from a tree, MSB-first encode
// - `bits`       — BitWriter / BitReader / BitStream
//
// One tree per stream. The decoder rebuilds it from the transmitted
// frequency table, never from the encoded bytes.

pub mod bits;
pub mod code_table;
pub mod frequency;
pub mod tree;

pub use bits::{BitReader, BitStream, BitWriter};
pub use code_table::{Code, CodeTable};
pub use frequency::FrequencyTable;
pub use tree::{HuffmanTree, Node};

use crate::error::{Error, Result};

/// Count, build, and encode `values` in one step.
///
/// An empty stream yields an empty table and an empty bitstream.
pub fn encode_values(values: &[i64]) -> Result<(FrequencyTable, BitStream)> {
    let freq = FrequencyTable::from_values(values);
    let Some(tree) = HuffmanTree::build(&freq) else {
        return Ok((freq, BitStream::default()));
    };
    let codes = tree.codes()?;
    let stream = codes.encode(values)?;
    log::debug!(
        "huffman: {} values, {} symbols, {} bits (max code {} bits)",
        values.len(),
        freq.len(),
        stream.bit_len(),
        codes.max_len()
    );
    Ok((freq, stream))
}

/// Decode a bitstream produced by [`encode_values`] with the same table.
///
/// The bit count is recovered from the table (sum of count x code length),
/// so `data` must hold exactly that many bits rounded up to whole bytes.
pub fn decode_values(freq: &FrequencyTable, data: &[u8]) -> Result<Vec<i64>> {
    let Some(tree) = HuffmanTree::build(freq) else {
        if !data.is_empty() {
            return Err(Error::malformed(format!(
                "{} bitstream bytes with an empty frequency table",
                data.len()
            )));
        }
        return Ok(Vec::new());
    };
    let codes = tree.codes()?;
    let total_bits = codes.encoded_bits(freq)?;
    let needed = BitStream::byte_len_for(total_bits);
    if (data.len() as u64) > needed {
        return Err(Error::malformed(format!(
            "{} trailing bytes after a {total_bits}-bit stream",
            data.len() as u64 - needed
        )));
    }

    let values = tree.decode_bits(data, total_bits)?;
    if values.len() as u64 != freq.total() {
        return Err(Error::Unterminated {
            bit_offset: total_bits,
            total_bits,
            reason: "decoded value count disagrees with frequency table",
        });
    }
    Ok(values)
}
