// Huffman tree stored as an index-addressed arena.
//
// Leaves occupy indices 0..n in ascending value order; every merge appends
// an internal node. The priority queue orders by (frequency, index), so among
// equal frequencies the older node wins, and the first node popped becomes
// the left child. The root is always the last node.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::bits::{BitReader, BitStream};
use super::code_table::CodeTable;
use super::frequency::FrequencyTable;
use crate::error::{Error, Result};

/// Arena node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Leaf { value: i64, freq: u64 },
    Internal { freq: u64, left: usize, right: usize },
}

impl Node {
    #[inline]
    pub fn freq(&self) -> u64 {
        match *self {
            Node::Leaf { freq, .. } | Node::Internal { freq, .. } => freq,
        }
    }
}

/// Static Huffman tree over a [`FrequencyTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build the tree bottom-up. Returns `None` for an empty table.
    ///
    /// A table with one distinct value yields a single-leaf tree; its code is
    /// the one bit `0` (see [`CodeTable::from_tree`]).
    pub fn build(freq: &FrequencyTable) -> Option<Self> {
        if freq.is_empty() {
            return None;
        }

        let mut nodes: Vec<Node> = Vec::with_capacity(2 * freq.len() - 1);
        let mut heap = BinaryHeap::with_capacity(freq.len());
        for (value, count) in freq.iter() {
            heap.push(Reverse((count, nodes.len())));
            nodes.push(Node::Leaf { value, freq: count });
        }

        while heap.len() > 1 {
            let (Some(Reverse((lf, left))), Some(Reverse((rf, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let freq = lf + rf;
            heap.push(Reverse((freq, nodes.len())));
            nodes.push(Node::Internal { freq, left, right });
        }

        let root = nodes.len() - 1;
        log::trace!(
            "huffman tree: {} leaves, {} nodes, root weight {}",
            freq.len(),
            nodes.len(),
            nodes[root].freq()
        );
        Some(Self { nodes, root })
    }

    #[inline]
    pub fn root(&self) -> usize {
        self.root
    }

    #[inline]
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of distinct values (leaves).
    pub fn leaf_count(&self) -> usize {
        self.nodes.len().div_ceil(2)
    }

    /// Derive the code table for this tree.
    pub fn codes(&self) -> Result<CodeTable> {
        CodeTable::from_tree(self)
    }

    /// Decode exactly `total_bits` bits of `data` into values.
    ///
    /// Padding past `total_bits` is ignored. Fails if `data` is shorter than
    /// `total_bits`, or if the last code is cut off at `total_bits`.
    pub fn decode_bits(&self, data: &[u8], total_bits: u64) -> Result<Vec<i64>> {
        let needed = BitStream::byte_len_for(total_bits);
        if needed > data.len() as u64 {
            return Err(Error::Truncated {
                what: "bitstream",
                needed,
                available: data.len() as u64,
            });
        }

        let mut reader = BitReader::new(data);
        let mut out = Vec::with_capacity(data.len());

        if let Node::Leaf { value, .. } = self.nodes[self.root] {
            // Single-leaf tree: every code is one `0` bit.
            while reader.position() < total_bits {
                let at = reader.position();
                match reader.read_bit() {
                    Some(false) => out.push(value),
                    Some(true) => {
                        return Err(Error::Unterminated {
                            bit_offset: at,
                            total_bits,
                            reason: "1 bit below a single-leaf root",
                        });
                    }
                    None => break,
                }
            }
            return Ok(out);
        }

        let mut node = self.root;
        while reader.position() < total_bits {
            let Some(bit) = reader.read_bit() else { break };
            node = match self.nodes[node] {
                Node::Internal { left, right, .. } => {
                    if bit {
                        right
                    } else {
                        left
                    }
                }
                // The walk resets to the root after every leaf.
                Node::Leaf { .. } => {
                    return Err(Error::Unterminated {
                        bit_offset: reader.position() - 1,
                        total_bits,
                        reason: "walk stepped past a leaf",
                    });
                }
            };
            if let Node::Leaf { value, .. } = self.nodes[node] {
                out.push(value);
                node = self.root;
            }
        }

        if node != self.root {
            return Err(Error::Unterminated {
                bit_offset: reader.position(),
                total_bits,
                reason: "stream ends inside a code",
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn leaf_value(tree: &HuffmanTree, index: usize) -> Option<i64> {
        match *tree.node(index) {
            Node::Leaf { value, .. } => Some(value),
            Node::Internal { .. } => None,
        }
    }

    #[test]
    fn empty_table_has_no_tree() {
        assert!(HuffmanTree::build(&FrequencyTable::new()).is_none());
    }

    #[test]
    fn single_value_tree() {
        let tree = HuffmanTree::build(&FrequencyTable::from_values(&[7, 7, 7])).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(leaf_value(&tree, tree.root()), Some(7));
        assert_eq!(tree.decode_bits(&[0x00], 3).unwrap(), vec![7, 7, 7]);
    }

    #[test]
    fn single_value_tree_rejects_one_bits() {
        let tree = HuffmanTree::build(&FrequencyTable::from_values(&[7])).unwrap();
        let err = tree.decode_bits(&[0x20], 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecConsistency);
    }

    #[test]
    fn tie_break_is_fixed() {
        // 5:4, 10:4, 100:1, 440:1 -> leaves 0..4 in value order.
        let freq = FrequencyTable::from_values(&[440, 100, 5, 5, 5, 5, 10, 10, 10, 10]);
        let tree = HuffmanTree::build(&freq).unwrap();
        assert_eq!(
            tree.nodes(),
            &[
                Node::Leaf { value: 5, freq: 4 },
                Node::Leaf { value: 10, freq: 4 },
                Node::Leaf { value: 100, freq: 1 },
                Node::Leaf { value: 440, freq: 1 },
                Node::Internal { freq: 2, left: 2, right: 3 },
                Node::Internal { freq: 6, left: 4, right: 0 },
                Node::Internal { freq: 10, left: 1, right: 5 },
            ]
        );
        assert_eq!(tree.root(), 6);
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn build_is_deterministic() {
        let values: Vec<i64> = (0..500).map(|i| (i * 37 % 23) - 11).collect();
        let freq = FrequencyTable::from_values(&values);
        assert_eq!(HuffmanTree::build(&freq), HuffmanTree::build(&freq));
    }

    #[test]
    fn decode_ignores_padding() {
        let freq = FrequencyTable::from_values(&[440, 100, 5, 5, 5, 5, 10, 10, 10, 10]);
        let tree = HuffmanTree::build(&freq).unwrap();
        // 101 100 11 11 11 11 0 0 0 0 + six padding ones that must be ignored
        let data = [0xB3, 0xFC, 0x3F];
        assert_eq!(
            tree.decode_bits(&data, 18).unwrap(),
            vec![440, 100, 5, 5, 5, 5, 10, 10, 10, 10]
        );
    }

    #[test]
    fn decode_rejects_cut_code() {
        let freq = FrequencyTable::from_values(&[440, 100, 5, 5, 5, 5, 10, 10, 10, 10]);
        let tree = HuffmanTree::build(&freq).unwrap();
        // "10" is a prefix of 100/101 but not a code.
        let err = tree.decode_bits(&[0x80], 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecConsistency);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let freq = FrequencyTable::from_values(&[1, 2]);
        let tree = HuffmanTree::build(&freq).unwrap();
        let err = tree.decode_bits(&[0x00], 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }
}
