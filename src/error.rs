// Crate-wide error type.
//
// Every failure is a deterministic function of the input, so nothing here is
// retryable. `Error::kind()` groups variants into the four failure classes
// callers care about.

use std::io;

use thiserror::Error;

/// Result type for codec operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse failure class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed WAV header, unsupported layout, malformed compressed header.
    Format,
    /// Input ends before a declared length.
    TruncatedInput,
    /// Code table / tree / stream disagree with each other.
    CodecConsistency,
    /// Underlying reader or writer failed.
    Io,
}

/// Errors raised by the WAV codec, the Huffman engine and the container.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unsupported RIFF/WAVE input.
    #[error("invalid WAV at byte {offset}: {reason}")]
    Wav {
        /// Byte offset of the violation.
        offset: u64,
        /// What was wrong.
        reason: String,
    },

    /// Sample layout the converter cannot represent.
    #[error("unsupported sample layout: {0}")]
    Unsupported(String),

    /// Malformed compressed header or payload.
    #[error("malformed compressed stream: {0}")]
    Malformed(String),

    /// A declared length runs past the end of the input.
    #[error("truncated {what}: need {needed} bytes, {available} available")]
    Truncated {
        /// Which structure was being read.
        what: &'static str,
        /// Bytes required.
        needed: u64,
        /// Bytes actually present.
        available: u64,
    },

    /// A value to encode has no entry in the code table.
    #[error("value {value} has no Huffman code")]
    MissingCode {
        /// The unresolved value.
        value: i64,
    },

    /// The bitstream does not end on a code boundary.
    #[error("code walk did not terminate: {reason} at bit {bit_offset} of {total_bits}")]
    Unterminated {
        /// Bit position where decoding stopped.
        bit_offset: u64,
        /// Declared bit count of the stream.
        total_bits: u64,
        /// What went wrong.
        reason: &'static str,
    },

    /// A Huffman code is longer than the 64-bit code register.
    #[error("code for value {value} is {len} bits long (max 64)")]
    CodeTooLong {
        /// Leaf value.
        value: i64,
        /// Depth of the leaf.
        len: usize,
    },

    /// Running delta sum left the working integer range.
    #[error("delta reconstruction overflows at frame {index}")]
    DeltaOverflow {
        /// Frame index of the overflowing sum.
        index: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Creates a WAV format error at `offset`.
    pub fn wav(offset: usize, reason: impl Into<String>) -> Self {
        Self::Wav {
            offset: offset as u64,
            reason: reason.into(),
        }
    }

    /// Creates a malformed compressed-stream error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Creates a truncation error.
    pub fn truncated(what: &'static str, needed: usize, available: usize) -> Self {
        Self::Truncated {
            what,
            needed: needed as u64,
            available: available as u64,
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Wav { .. } | Self::Unsupported(_) | Self::Malformed(_) => ErrorKind::Format,
            Self::Truncated { .. } => ErrorKind::TruncatedInput,
            Self::MissingCode { .. }
            | Self::Unterminated { .. }
            | Self::CodeTooLong { .. }
            | Self::DeltaOverflow { .. } => ErrorKind::CodecConsistency,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
