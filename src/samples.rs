// Raw PCM bytes <-> (channel A, channel B) sample pairs.
//
// 8-bit PCM is unsigned, 16- and 32-bit PCM are signed two's complement, all
// little-endian. Mono frames carry 0 in channel B. Frames with more than two
// channels keep only the first two.

use crate::error::{Error, Result};
use crate::wav::AudioFormat;

/// One frame: a sample for each of the first two channels.
///
/// `i64` holds any 32-bit sample and any difference of two of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SamplePair(pub i64, pub i64);

impl SamplePair {
    #[inline]
    pub fn new(a: i64, b: i64) -> Self {
        Self(a, b)
    }
}

impl From<(i64, i64)> for SamplePair {
    fn from((a, b): (i64, i64)) -> Self {
        Self(a, b)
    }
}

/// Sample width in bytes for a supported bit depth.
fn sample_width(bits_per_sample: u16) -> Result<usize> {
    match bits_per_sample {
        8 | 16 | 32 => Ok(usize::from(bits_per_sample / 8)),
        other => Err(Error::Unsupported(format!(
            "{other}-bit samples (supported: 8, 16, 32)"
        ))),
    }
}

fn frame_layout(format: &AudioFormat) -> Result<(usize, usize)> {
    let width = sample_width(format.bits_per_sample)?;
    if format.channel_count == 0 {
        return Err(Error::Unsupported("zero channels".into()));
    }
    Ok((width, width * usize::from(format.channel_count)))
}

#[inline]
fn read_sample(bytes: &[u8], width: usize) -> i64 {
    match width {
        1 => i64::from(bytes[0]),
        2 => i64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
        _ => i64::from(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
    }
}

#[inline]
fn write_sample(out: &mut [u8], width: usize, value: i64, frame: usize) -> Result<()> {
    let out_of_range = || {
        Error::Unsupported(format!(
            "sample {value} at frame {frame} does not fit {} bits",
            width * 8
        ))
    };
    match width {
        1 => out[0] = u8::try_from(value).map_err(|_| out_of_range())?,
        2 => {
            let v = i16::try_from(value).map_err(|_| out_of_range())?;
            out.copy_from_slice(&v.to_le_bytes());
        }
        _ => {
            let v = i32::try_from(value).map_err(|_| out_of_range())?;
            out.copy_from_slice(&v.to_le_bytes());
        }
    }
    Ok(())
}

/// Split interleaved PCM into sample pairs.
///
/// The PCM length must be a whole number of frames; a dangling partial frame
/// could not be restored by [`to_bytes`].
pub fn to_pairs(format: &AudioFormat, pcm: &[u8]) -> Result<Vec<SamplePair>> {
    let (width, frame_len) = frame_layout(format)?;
    if pcm.len() % frame_len != 0 {
        return Err(Error::Unsupported(format!(
            "{} PCM bytes is not a whole number of {frame_len}-byte frames",
            pcm.len()
        )));
    }

    let pairs = pcm
        .chunks_exact(frame_len)
        .map(|frame| {
            let a = read_sample(&frame[..width], width);
            let b = if format.channel_count > 1 {
                read_sample(&frame[width..2 * width], width)
            } else {
                0
            };
            SamplePair(a, b)
        })
        .collect();
    Ok(pairs)
}

/// Interleave sample pairs back into PCM bytes.
///
/// Channels past the second are written as silence (zero bytes).
pub fn to_bytes(format: &AudioFormat, pairs: &[SamplePair]) -> Result<Vec<u8>> {
    let (width, frame_len) = frame_layout(format)?;
    let mut pcm = vec![0u8; pairs.len() * frame_len];

    for (i, (pair, frame)) in pairs.iter().zip(pcm.chunks_exact_mut(frame_len)).enumerate() {
        write_sample(&mut frame[..width], width, pair.0, i)?;
        if format.channel_count > 1 {
            write_sample(&mut frame[width..2 * width], width, pair.1, i)?;
        }
    }
    Ok(pcm)
}

/// Interleave pairs into a flat value stream: `a0, b0, a1, b1, ...`.
pub fn flatten(pairs: &[SamplePair]) -> Vec<i64> {
    pairs.iter().flat_map(|p| [p.0, p.1]).collect()
}

/// Inverse of [`flatten`]. The stream length must be even.
pub fn unflatten(values: &[i64]) -> Result<Vec<SamplePair>> {
    if values.len() % 2 != 0 {
        return Err(Error::malformed(format!(
            "{} values cannot form sample pairs",
            values.len()
        )));
    }
    Ok(values
        .chunks_exact(2)
        .map(|v| SamplePair(v[0], v[1]))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
