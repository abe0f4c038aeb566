//! Wavhuff: lossless compression of PCM WAV audio.
//!
//! Samples are split into (channel A, channel B) pairs, delta coded against
//! the previous frame, flattened, and Huffman coded with a single static tree.
//! The frequency table travels with the bitstream, so decompression rebuilds
//! the exact tree the encoder used.
//!
//! The crate provides:
//! - WAV parsing and canonical serialization (`wav`)
//! - Sample conversion and delta coding (`samples`, `delta`)
//! - A deterministic Huffman engine (`huffman`)
//! - The compressed container and the end-to-end pipeline (`container`, `codec`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! let wav_bytes = std::fs::read("tone.wav").unwrap();
//! let packed = wavhuff::compress(&wav_bytes).unwrap();
//! let restored = wavhuff::decompress(&packed).unwrap();
//! assert_eq!(wavhuff::wav::parse(&restored).unwrap().pcm,
//!            wavhuff::wav::parse(&wav_bytes).unwrap().pcm);
//! ```

pub mod codec;
pub mod container;
pub mod delta;
pub mod error;
pub mod huffman;
pub mod io;
pub mod samples;
pub mod varint;
pub mod wav;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::{compress, decompress};
pub use error::{Error, ErrorKind, Result};
