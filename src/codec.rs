// Codec pipeline: ties the WAV codec, sample conversion, delta coding and the
// Huffman engine to the compressed container.
//
// Compression:
//   WAV bytes -> WavAudio -> sample pairs -> deltas -> flat values
//   -> frequency table + bitstream -> container
//
// Decompression runs the same stages backwards. Every stage works on whole
// buffers; writers are only touched once the full output exists.

use std::io::{Read, Write};

use crate::container::{self, ContainerHeader};
use crate::delta;
use crate::error::{Error, Result};
use crate::huffman::{self, FrequencyTable};
use crate::samples;
use crate::wav::{self, AudioFormat, WavAudio};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Sizes observed while compressing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressReport {
    pub format: AudioFormat,
    /// Sample pairs (frames) encoded.
    pub frames: usize,
    /// Distinct values in the flattened delta stream.
    pub symbols: usize,
    /// Bitstream length in bits, padding excluded.
    pub bit_len: u64,
    /// Frequency table plus bitstream.
    pub payload_bytes: usize,
    /// PCM bytes read from the WAV `data` chunk.
    pub pcm_bytes: usize,
    /// Total container size.
    pub output_bytes: usize,
}

impl CompressReport {
    /// Container size over PCM size; 0 for empty audio.
    pub fn ratio(&self) -> f64 {
        if self.pcm_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.pcm_bytes as f64
        }
    }
}

/// Sizes observed while decompressing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressReport {
    pub format: AudioFormat,
    pub frames: usize,
    pub symbols: usize,
    pub bit_len: u64,
    pub payload_bytes: usize,
    /// PCM bytes reconstructed.
    pub pcm_bytes: usize,
    /// Total WAV size written.
    pub output_bytes: usize,
}

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

/// Compress a WAV file held in memory.
pub fn compress(wav_bytes: &[u8]) -> Result<Vec<u8>> {
    let audio = wav::parse(wav_bytes)?;
    encode_audio(&audio).map(|(out, _)| out)
}

/// Read a whole WAV stream from `input` and write the container to `output`.
pub fn compress_stream<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<CompressReport> {
    let mut wav_bytes = Vec::new();
    input.read_to_end(&mut wav_bytes)?;
    let audio = wav::parse(&wav_bytes)?;
    let (out, report) = encode_audio(&audio)?;
    output.write_all(&out)?;
    output.flush()?;
    Ok(report)
}

/// Compress parsed audio into container bytes.
pub fn encode_audio(audio: &WavAudio) -> Result<(Vec<u8>, CompressReport)> {
    let format = audio.format;
    if !(1..=2).contains(&format.channel_count) {
        return Err(Error::Unsupported(format!(
            "{} channels (supported: 1, 2)",
            format.channel_count
        )));
    }

    let pairs = samples::to_pairs(&format, &audio.pcm)?;
    let deltas = delta::encode(&pairs);
    let values = samples::flatten(&deltas);
    let (freq, stream) = huffman::encode_values(&values)?;

    let mut payload = Vec::with_capacity(freq.encoded_len() + stream.as_bytes().len());
    freq.write_to(&mut payload)?;
    payload.extend_from_slice(stream.as_bytes());

    let out = container::write(&format, &payload)?;
    let report = CompressReport {
        format,
        frames: pairs.len(),
        symbols: freq.len(),
        bit_len: stream.bit_len(),
        payload_bytes: payload.len(),
        pcm_bytes: audio.pcm.len(),
        output_bytes: out.len(),
    };
    log::debug!(
        "compress: {} Hz, {} ch, {} bit, {} frames, {} symbols, {} bits, payload {} bytes, {} -> {} bytes",
        format.sample_rate,
        format.channel_count,
        format.bits_per_sample,
        report.frames,
        report.symbols,
        report.bit_len,
        report.payload_bytes,
        report.pcm_bytes,
        report.output_bytes
    );
    Ok((out, report))
}

// ---------------------------------------------------------------------------
// Decompression
// ---------------------------------------------------------------------------

/// Decompress a container held in memory back into WAV bytes.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let (audio, _) = decode_audio(compressed)?;
    wav::serialize(&audio.format, &audio.pcm)
}

/// Read a whole container from `input` and write the WAV file to `output`.
pub fn decompress_stream<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<DecompressReport> {
    let mut compressed = Vec::new();
    input.read_to_end(&mut compressed)?;
    let (audio, report) = decode_audio(&compressed)?;
    let out = wav::serialize(&audio.format, &audio.pcm)?;
    output.write_all(&out)?;
    output.flush()?;
    Ok(DecompressReport {
        output_bytes: out.len(),
        ..report
    })
}

/// Decode container bytes into audio.
///
/// `output_bytes` of the report is the size of the canonical WAV file the
/// audio serializes to.
pub fn decode_audio(compressed: &[u8]) -> Result<(WavAudio, DecompressReport)> {
    let file = container::read(compressed)?;
    file.header.validate()?;
    let format = file.header.format;

    let (freq, table_len) = FrequencyTable::read_from(&file.payload)?;
    let values = huffman::decode_values(&freq, &file.payload[table_len..])?;
    let deltas = samples::unflatten(&values)?;
    let pairs = delta::decode(&deltas)?;
    let pcm = samples::to_bytes(&format, &pairs)?;

    let bit_len = huffman::HuffmanTree::build(&freq)
        .map(|tree| tree.codes().and_then(|codes| codes.encoded_bits(&freq)))
        .transpose()?
        .unwrap_or(0);
    let report = DecompressReport {
        format,
        frames: pairs.len(),
        symbols: freq.len(),
        bit_len,
        payload_bytes: file.payload.len(),
        pcm_bytes: pcm.len(),
        output_bytes: wav::CANONICAL_HEADER_LEN + pcm.len(),
    };
    log::debug!(
        "decompress: {} Hz, {} ch, {} bit, {} frames, {} symbols, {} bits, {} -> {} PCM bytes",
        format.sample_rate,
        format.channel_count,
        format.bits_per_sample,
        report.frames,
        report.symbols,
        report.bit_len,
        report.payload_bytes,
        report.pcm_bytes
    );
    Ok((WavAudio { format, pcm }, report))
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Header and code statistics of a container, without rebuilding PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub header: ContainerHeader,
    pub table: FrequencyTable,
    /// Serialized frequency table size.
    pub table_bytes: usize,
    pub bit_len: u64,
}

/// Parse a container's header and frequency table.
pub fn inspect(compressed: &[u8]) -> Result<ContainerInfo> {
    let file = container::read(compressed)?;
    file.header.validate()?;
    let (table, table_bytes) = FrequencyTable::read_from(&file.payload)?;
    let bit_len = match huffman::HuffmanTree::build(&table) {
        Some(tree) => tree.codes()?.encoded_bits(&table)?,
        None => 0,
    };
    Ok(ContainerInfo {
        header: file.header,
        table,
        table_bytes,
        bit_len,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
