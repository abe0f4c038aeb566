// Compressed file container.
//
// Layout (all little-endian):
//   0   u16  channel count
//   2   u16  bits per sample
//   4   u32  sample rate
//   8   u32  payload byte length
//   12  ..   payload
//
// The payload is the serialized frequency table followed by the packed
// bitstream (see `huffman::frequency`).

use std::io::Write;

use crate::error::{Error, Result};
use crate::wav::AudioFormat;

/// Fixed header size.
pub const HEADER_LEN: usize = 12;

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub format: AudioFormat,
    /// Declared payload length in bytes.
    pub payload_len: u32,
}

impl ContainerHeader {
    /// Encode the header to a writer.
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.format.channel_count.to_le_bytes())?;
        w.write_all(&self.format.bits_per_sample.to_le_bytes())?;
        w.write_all(&self.format.sample_rate.to_le_bytes())?;
        w.write_all(&self.payload_len.to_le_bytes())?;
        Ok(())
    }

    /// Decode a header from the first [`HEADER_LEN`] bytes of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let Some(h) = data.get(..HEADER_LEN) else {
            return Err(Error::truncated("container header", HEADER_LEN, data.len()));
        };
        Ok(Self {
            format: AudioFormat {
                channel_count: u16::from_le_bytes([h[0], h[1]]),
                bits_per_sample: u16::from_le_bytes([h[2], h[3]]),
                sample_rate: u32::from_le_bytes([h[4], h[5], h[6], h[7]]),
            },
            payload_len: u32::from_le_bytes([h[8], h[9], h[10], h[11]]),
        })
    }

    /// Reject layouts the codec never writes.
    pub fn validate(&self) -> Result<()> {
        let AudioFormat {
            channel_count,
            bits_per_sample,
            ..
        } = self.format;
        if !(1..=2).contains(&channel_count) {
            return Err(Error::malformed(format!(
                "header declares {channel_count} channels (expected 1 or 2)"
            )));
        }
        if !matches!(bits_per_sample, 8 | 16 | 32) {
            return Err(Error::malformed(format!(
                "header declares {bits_per_sample}-bit samples (expected 8, 16 or 32)"
            )));
        }
        Ok(())
    }
}

/// A whole compressed file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedFile {
    pub header: ContainerHeader,
    pub payload: Vec<u8>,
}

/// Write header and payload.
pub fn write_to<W: Write>(w: &mut W, format: &AudioFormat, payload: &[u8]) -> Result<()> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        Error::malformed(format!(
            "payload of {} bytes exceeds the 32-bit length field",
            payload.len()
        ))
    })?;
    ContainerHeader {
        format: *format,
        payload_len,
    }
    .encode(w)?;
    w.write_all(payload)?;
    Ok(())
}

/// Serialize a container into a new buffer.
pub fn write(format: &AudioFormat, payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    write_to(&mut out, format, payload)?;
    Ok(out)
}

/// Parse a container: header, then exactly `payload_len` payload bytes.
///
/// Bytes past the declared payload are rejected.
pub fn read(data: &[u8]) -> Result<CompressedFile> {
    let header = ContainerHeader::decode(data)?;
    let body = &data[HEADER_LEN..];
    let declared = header.payload_len as usize;
    if body.len() < declared {
        return Err(Error::truncated("payload", declared, body.len()));
    }
    if body.len() > declared {
        return Err(Error::malformed(format!(
            "{} bytes after the declared {declared}-byte payload",
            body.len() - declared
        )));
    }
    Ok(CompressedFile {
        header,
        payload: body.to_vec(),
    })
}
