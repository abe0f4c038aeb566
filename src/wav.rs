// RIFF/WAVE container parsing and serialization (PCM only).
//
// Parsing walks the subchunk list by declared id and size, so metadata
// chunks (LIST, fact, bext, ...) before or between `fmt ` and `data` are
// skipped. Serialization always emits the canonical 44-byte header.

use std::io::Write;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const RIFF_TAG: [u8; 4] = *b"RIFF";
pub const WAVE_TAG: [u8; 4] = *b"WAVE";
pub const FMT_TAG: [u8; 4] = *b"fmt ";
pub const DATA_TAG: [u8; 4] = *b"data";

/// `wFormatTag` for integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Size of the canonical PCM header written by [`serialize`].
pub const CANONICAL_HEADER_LEN: usize = 44;

/// Minimum size of a PCM `fmt ` subchunk body.
const FMT_PCM_LEN: u32 = 16;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Stream parameters shared by the WAV file and the compressed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Interleaved channels per frame.
    pub channel_count: u16,
    /// Bits per sample (8, 16 or 32 for the sample converter).
    pub bits_per_sample: u16,
    /// Frames per second.
    pub sample_rate: u32,
}

impl AudioFormat {
    /// Bytes per single-channel sample.
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes per interleaved frame (`blockAlign`).
    ///
    /// Errors when the value does not fit the 16-bit header field.
    pub fn block_align(&self) -> Result<u16> {
        let bits = u64::from(self.channel_count) * u64::from(self.bits_per_sample);
        u16::try_from(bits / 8).map_err(|_| {
            Error::wav(
                32,
                format!(
                    "block align for {} ch x {} bit does not fit 16 bits",
                    self.channel_count, self.bits_per_sample
                ),
            )
        })
    }

    /// Bytes per second (`byteRate`).
    ///
    /// Errors when the value does not fit the 32-bit header field.
    pub fn byte_rate(&self) -> Result<u32> {
        let bits = u64::from(self.sample_rate)
            * u64::from(self.channel_count)
            * u64::from(self.bits_per_sample);
        u32::try_from(bits / 8).map_err(|_| {
            Error::wav(
                28,
                format!(
                    "byte rate for {} Hz x {} ch x {} bit does not fit 32 bits",
                    self.sample_rate, self.channel_count, self.bits_per_sample
                ),
            )
        })
    }
}

/// A parsed WAV file: format fields plus the raw `data` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavAudio {
    pub format: AudioFormat,
    /// Interleaved little-endian PCM bytes, exactly as stored.
    pub pcm: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Cursor over the input that remembers the absolute offset for errors.
struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::wav(
                self.pos,
                format!(
                    "truncated {what}: need {len} bytes, {} available",
                    self.remaining()
                ),
            ));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Skip the pad byte that follows an odd-sized chunk body. A missing pad
    /// at the end of input is tolerated.
    fn skip_pad(&mut self, size: u32) {
        if size % 2 == 1 && self.remaining() > 0 {
            self.pos += 1;
        }
    }

    fn tag(&mut self, what: &str) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.take(4, what)?);
        Ok(tag)
    }

    fn u16_le(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32_le(&mut self, what: &str) -> Result<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Parse a RIFF/WAVE PCM file.
///
/// Returns the format fields and a copy of the `data` subchunk. The RIFF
/// size field is read but not trusted; the walk is bounded by the buffer.
pub fn parse(data: &[u8]) -> Result<WavAudio> {
    let mut r = ChunkReader::new(data);

    let riff = r.tag("RIFF tag")?;
    if riff != RIFF_TAG {
        return Err(Error::wav(0, format!("expected RIFF tag, got {riff:02X?}")));
    }
    let riff_size = r.u32_le("RIFF size")?;
    let wave = r.tag("WAVE tag")?;
    if wave != WAVE_TAG {
        return Err(Error::wav(8, format!("expected WAVE tag, got {wave:02X?}")));
    }
    log::trace!("RIFF size {riff_size}, buffer {} bytes", data.len());

    let mut format: Option<AudioFormat> = None;

    loop {
        if r.remaining() == 0 {
            let reason = if format.is_none() {
                "no fmt subchunk before end of input"
            } else {
                "no data subchunk before end of input"
            };
            return Err(Error::wav(r.pos, reason));
        }

        let chunk_start = r.pos;
        let id = r.tag("subchunk id")?;
        let size = r.u32_le("subchunk size")?;

        match id {
            FMT_TAG => {
                if size < FMT_PCM_LEN {
                    return Err(Error::wav(
                        chunk_start,
                        format!("fmt subchunk is {size} bytes, need at least {FMT_PCM_LEN}"),
                    ));
                }
                let audio_format = r.u16_le("audio format")?;
                let channel_count = r.u16_le("channel count")?;
                let sample_rate = r.u32_le("sample rate")?;
                let _byte_rate = r.u32_le("byte rate")?;
                let _block_align = r.u16_le("block align")?;
                let bits_per_sample = r.u16_le("bits per sample")?;
                // cbSize and any extension bytes.
                r.take((size - FMT_PCM_LEN) as usize, "fmt extension")?;
                r.skip_pad(size);

                if audio_format != WAVE_FORMAT_PCM {
                    return Err(Error::wav(
                        chunk_start + 8,
                        format!("audio format {audio_format:#06X} is not PCM"),
                    ));
                }
                format = Some(AudioFormat {
                    channel_count,
                    bits_per_sample,
                    sample_rate,
                });
            }
            DATA_TAG => {
                let Some(format) = format else {
                    return Err(Error::wav(chunk_start, "data subchunk precedes fmt"));
                };
                let pcm = r.take(size as usize, "data subchunk")?.to_vec();
                log::debug!(
                    "WAV: {} ch, {} bit, {} Hz, {} PCM bytes at offset {}",
                    format.channel_count,
                    format.bits_per_sample,
                    format.sample_rate,
                    pcm.len(),
                    chunk_start + 8
                );
                return Ok(WavAudio { format, pcm });
            }
            other => {
                log::trace!(
                    "skipping subchunk {:?} ({size} bytes) at {chunk_start}",
                    String::from_utf8_lossy(&other)
                );
                r.take(size as usize, "subchunk body")?;
                r.skip_pad(size);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Write the canonical 44-byte PCM header followed by `pcm`.
pub fn write_to<W: Write>(w: &mut W, format: &AudioFormat, pcm: &[u8]) -> Result<()> {
    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or_else(|| {
            Error::wav(
                CANONICAL_HEADER_LEN,
                format!("{} PCM bytes do not fit a RIFF size field", pcm.len()),
            )
        })?;
    let byte_rate = format.byte_rate()?;
    let block_align = format.block_align()?;

    w.write_all(&RIFF_TAG)?;
    w.write_all(&(36 + data_len).to_le_bytes())?;
    w.write_all(&WAVE_TAG)?;

    w.write_all(&FMT_TAG)?;
    w.write_all(&FMT_PCM_LEN.to_le_bytes())?;
    w.write_all(&WAVE_FORMAT_PCM.to_le_bytes())?;
    w.write_all(&format.channel_count.to_le_bytes())?;
    w.write_all(&format.sample_rate.to_le_bytes())?;
    w.write_all(&byte_rate.to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&format.bits_per_sample.to_le_bytes())?;

    w.write_all(&DATA_TAG)?;
    w.write_all(&data_len.to_le_bytes())?;
    w.write_all(pcm)?;
    Ok(())
}

/// Serialize a WAV file into a new buffer.
pub fn serialize(format: &AudioFormat, pcm: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(CANONICAL_HEADER_LEN + pcm.len());
    write_to(&mut out, format, pcm)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
