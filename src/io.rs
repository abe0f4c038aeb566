// File-level helpers around the codec pipeline.
//
// `compress_file()` and `decompress_file()` read the whole input, run the
// in-memory pipeline, and write the result through a `BufWriter`. The output
// file is only created once encoding or decoding has succeeded. With the
// `file-io` feature the PCM payload is hashed on both sides, so a round trip
// can be checked by comparing digests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec;
use crate::error::Result;
use crate::wav::{self, AudioFormat};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by [`compress_file`] and [`decompress_file`].
#[derive(Debug, Clone)]
pub struct FileStats {
    pub format: AudioFormat,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes.
    pub output_size: u64,
    /// Sample pairs processed.
    pub frames: u64,
    /// Distinct Huffman symbols.
    pub symbols: u64,
    /// Bitstream length in bits.
    pub bit_len: u64,
    /// Time spent in the codec, file I/O excluded.
    pub elapsed: Duration,
    /// SHA-256 of the PCM payload (if `file-io` feature is enabled).
    pub pcm_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

fn pcm_digest(_pcm: &[u8]) -> Option<[u8; 32]> {
    #[cfg(feature = "file-io")]
    {
        Some(sha2::Sha256::digest(_pcm).into())
    }
    #[cfg(not(feature = "file-io"))]
    {
        None
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// compress_file / decompress_file
// ---------------------------------------------------------------------------

/// Compress the WAV file at `input` into a container at `output`.
pub fn compress_file(input: &Path, output: &Path) -> Result<FileStats> {
    let wav_bytes = std::fs::read(input)?;

    let start = Instant::now();
    let audio = wav::parse(&wav_bytes)?;
    let (packed, report) = codec::encode_audio(&audio)?;
    let elapsed = start.elapsed();

    write_output(output, &packed)?;
    log::info!(
        "{} -> {}: {} -> {} bytes in {:.3}s",
        input.display(),
        output.display(),
        wav_bytes.len(),
        packed.len(),
        elapsed.as_secs_f64()
    );

    Ok(FileStats {
        format: report.format,
        input_size: wav_bytes.len() as u64,
        output_size: packed.len() as u64,
        frames: report.frames as u64,
        symbols: report.symbols as u64,
        bit_len: report.bit_len,
        elapsed,
        pcm_sha256: pcm_digest(&audio.pcm),
    })
}

/// Decompress the container at `input` into a canonical WAV file at `output`.
pub fn decompress_file(input: &Path, output: &Path) -> Result<FileStats> {
    let packed = std::fs::read(input)?;

    let start = Instant::now();
    let (audio, report) = codec::decode_audio(&packed)?;
    let wav_bytes = wav::serialize(&audio.format, &audio.pcm)?;
    let elapsed = start.elapsed();

    write_output(output, &wav_bytes)?;
    log::info!(
        "{} -> {}: {} -> {} bytes in {:.3}s",
        input.display(),
        output.display(),
        packed.len(),
        wav_bytes.len(),
        elapsed.as_secs_f64()
    );

    Ok(FileStats {
        format: report.format,
        input_size: packed.len() as u64,
        output_size: wav_bytes.len() as u64,
        frames: report.frames as u64,
        symbols: report.symbols as u64,
        bit_len: report.bit_len,
        elapsed,
        pcm_sha256: pcm_digest(&audio.pcm),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::samples::{self, SamplePair};

    fn stereo_sweep(frames: usize) -> Vec<u8> {
        let format = AudioFormat {
            channel_count: 2,
            bits_per_sample: 16,
            sample_rate: 44100,
        };
        let pairs: Vec<SamplePair> = (0..frames as i64)
            .map(|i| SamplePair((i * 13) % 2000 - 1000, 500 - (i * 7) % 1000))
            .collect();
        let pcm = samples::to_bytes(&format, &pairs).unwrap();
        wav::serialize(&format, &pcm).unwrap()
    }

    #[test]
    fn compress_decompress_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let wav_path = dir.path().join("in.wav");
        let packed_path = dir.path().join("in.whf");
        let out_path = dir.path().join("out.wav");
        let original = stereo_sweep(4096);
        std::fs::write(&wav_path, &original).unwrap();

        let enc = compress_file(&wav_path, &packed_path).unwrap();
        assert_eq!(enc.input_size, original.len() as u64);
        assert_eq!(enc.frames, 4096);
        assert!(enc.output_size < enc.input_size);
        assert_eq!(
            enc.output_size,
            std::fs::metadata(&packed_path).unwrap().len()
        );

        let dec = decompress_file(&packed_path, &out_path).unwrap();
        assert_eq!(dec.frames, 4096);
        assert_eq!(dec.symbols, enc.symbols);
        assert_eq!(dec.bit_len, enc.bit_len);
        assert_eq!(std::fs::read(&out_path).unwrap(), original);
    }

    #[cfg(feature = "file-io")]
    #[test]
    fn pcm_digests_match() {
        let dir = tempfile::tempdir().unwrap();
        let wav_path = dir.path().join("a.wav");
        let packed_path = dir.path().join("a.whf");
        let out_path = dir.path().join("b.wav");
        std::fs::write(&wav_path, stereo_sweep(300)).unwrap();

        let enc = compress_file(&wav_path, &packed_path).unwrap();
        let dec = decompress_file(&packed_path, &out_path).unwrap();
        assert!(enc.pcm_sha256.is_some());
        assert_eq!(enc.pcm_sha256, dec.pcm_sha256);
    }

    #[test]
    fn failed_compress_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.wav");
        let out = dir.path().join("bad.whf");
        std::fs::write(&bad, b"RIFF\x04\x00\x00\x00WAVE").unwrap();

        let err = compress_file(&bad, &out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(!out.exists());
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            decompress_file(&dir.path().join("nope.whf"), &dir.path().join("x.wav")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
