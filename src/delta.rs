// Componentwise delta coding of sample pairs.
//
// Element 0 is kept verbatim; every later element is replaced by its
// difference to the previous one. Neighbouring audio samples are strongly
// correlated, so the differences cluster near zero and the Huffman alphabet
// shrinks accordingly.

use crate::error::{Error, Result};
use crate::samples::SamplePair;

/// Replace each pair after the first with its difference to its predecessor.
///
/// Inputs come from [`crate::samples::to_pairs`] and lie in the 32-bit signed
/// range, so every difference fits `i64` exactly.
pub fn encode(pairs: &[SamplePair]) -> Vec<SamplePair> {
    let mut out = Vec::with_capacity(pairs.len());
    let mut prev: Option<SamplePair> = None;
    for &cur in pairs {
        out.push(match prev {
            None => cur,
            Some(p) => SamplePair(cur.0 - p.0, cur.1 - p.1),
        });
        prev = Some(cur);
    }
    out
}

/// Running-sum inverse of [`encode`].
///
/// Sums are checked: a stream whose prefix sums leave `i64` cannot have come
/// from [`encode`].
pub fn decode(deltas: &[SamplePair]) -> Result<Vec<SamplePair>> {
    let mut out: Vec<SamplePair> = Vec::with_capacity(deltas.len());
    for (index, &d) in deltas.iter().enumerate() {
        let next = match out.last() {
            None => d,
            Some(p) => {
                let a = p.0.checked_add(d.0);
                let b = p.1.checked_add(d.1);
                match (a, b) {
                    (Some(a), Some(b)) => SamplePair(a, b),
                    _ => return Err(Error::DeltaOverflow { index }),
                }
            }
        };
        out.push(next);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn pairs(v: &[(i64, i64)]) -> Vec<SamplePair> {
        v.iter().copied().map(SamplePair::from).collect()
    }

    #[test]
    fn tone_example() {
        let samples = pairs(&[(440, 100), (445, 105), (450, 110), (460, 120), (470, 130)]);
        let deltas = encode(&samples);
        assert_eq!(
            deltas,
            pairs(&[(440, 100), (5, 5), (5, 5), (10, 10), (10, 10)])
        );
        assert_eq!(decode(&deltas).unwrap(), samples);
    }

    #[test]
    fn empty_and_single() {
        assert!(encode(&[]).is_empty());
        assert!(decode(&[]).unwrap().is_empty());
        let one = pairs(&[(-7, 9)]);
        assert_eq!(encode(&one), one);
        assert_eq!(decode(&one).unwrap(), one);
    }

    #[test]
    fn full_32_bit_swing_is_exact() {
        let min = i32::MIN as i64;
        let max = i32::MAX as i64;
        let samples = pairs(&[(min, max), (max, min), (min, max)]);
        let deltas = encode(&samples);
        assert_eq!(deltas[1], SamplePair(max - min, min - max));
        assert_eq!(decode(&deltas).unwrap(), samples);
    }

    #[test]
    fn overflowing_stream_is_rejected() {
        let deltas = pairs(&[(i64::MAX, 0), (1, 0)]);
        let err = decode(&deltas).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecConsistency);
        assert!(matches!(err, Error::DeltaOverflow { index: 1 }));
    }
}
