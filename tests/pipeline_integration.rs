use std::io::Cursor;

use wavhuff::samples::{self, SamplePair};
use wavhuff::wav::{self, AudioFormat};
use wavhuff::{ErrorKind, codec, container, delta, huffman};

fn format(channel_count: u16, bits_per_sample: u16, sample_rate: u32) -> AudioFormat {
    AudioFormat {
        channel_count,
        bits_per_sample,
        sample_rate,
    }
}

fn sine_pairs(frames: usize, amplitude: f64) -> Vec<SamplePair> {
    (0..frames)
        .map(|i| {
            let t = i as f64 / 8000.0;
            let a = (amplitude * (2.0 * std::f64::consts::PI * 440.0 * t).sin()).round() as i64;
            let b = (amplitude * (2.0 * std::f64::consts::PI * 660.0 * t).sin()).round() as i64;
            SamplePair(a, b)
        })
        .collect()
}

#[test]
fn tone_scenario_stage_by_stage() {
    let fmt = format(2, 16, 8000);
    let pairs: Vec<SamplePair> = [(440, 100), (445, 105), (450, 110), (460, 120), (470, 130)]
        .into_iter()
        .map(SamplePair::from)
        .collect();

    let deltas = delta::encode(&pairs);
    assert_eq!(
        deltas,
        [(440, 100), (5, 5), (5, 5), (10, 10), (10, 10)]
            .into_iter()
            .map(SamplePair::from)
            .collect::<Vec<_>>()
    );
    let flat = samples::flatten(&deltas);
    assert_eq!(flat, vec![440, 100, 5, 5, 5, 5, 10, 10, 10, 10]);

    let (freq, stream) = huffman::encode_values(&flat).unwrap();
    assert_eq!(stream.bit_len(), 18);
    assert_eq!(huffman::decode_values(&freq, stream.as_bytes()).unwrap(), flat);

    let pcm = samples::to_bytes(&fmt, &pairs).unwrap();
    let wav_bytes = wav::serialize(&fmt, &pcm).unwrap();
    let packed = codec::compress(&wav_bytes).unwrap();
    let (audio, _) = codec::decode_audio(&packed).unwrap();
    assert_eq!(audio.pcm, pcm);
    assert_eq!(samples::to_pairs(&audio.format, &audio.pcm).unwrap(), pairs);
}

#[test]
fn smooth_audio_compresses() {
    let fmt = format(2, 16, 8000);
    // Deltas of a low-amplitude tone stay within a small alphabet.
    let pcm = samples::to_bytes(&fmt, &sine_pairs(8000, 100.0)).unwrap();
    let wav_bytes = wav::serialize(&fmt, &pcm).unwrap();

    let mut packed = Vec::new();
    let report = codec::compress_stream(&mut wav_bytes.as_slice(), &mut packed).unwrap();
    assert!(
        report.output_bytes < report.pcm_bytes / 2,
        "output={} pcm={}",
        report.output_bytes,
        report.pcm_bytes
    );
    assert!(report.ratio() < 0.5);
    assert_eq!(codec::decompress(&packed).unwrap(), wav_bytes);
}

#[test]
fn every_supported_layout_roundtrips() {
    for channels in [1u16, 2] {
        for bits in [8u16, 16, 32] {
            let fmt = format(channels, bits, 16000);
            // Amplitude 100 scaled into each sample range; mono leaves B at 0.
            let scale = |v: i64| match bits {
                8 => v + 128,
                16 => v * 100,
                _ => v * 1_000_000,
            };
            let pairs: Vec<SamplePair> = sine_pairs(500, 100.0)
                .into_iter()
                .map(|p| {
                    let b = if channels == 2 { scale(p.1) } else { 0 };
                    SamplePair(scale(p.0), b)
                })
                .collect();
            let pcm = samples::to_bytes(&fmt, &pairs).unwrap();
            let wav_bytes = wav::serialize(&fmt, &pcm).unwrap();
            let restored = codec::decompress(&codec::compress(&wav_bytes).unwrap()).unwrap();
            assert_eq!(restored, wav_bytes, "{channels} ch / {bits} bit");
        }
    }
}

#[test]
fn metadata_chunks_are_dropped_but_audio_survives() {
    let fmt = format(1, 16, 8000);
    let pcm = samples::to_bytes(&fmt, &sine_pairs(64, 1000.0)).unwrap();
    let canonical = wav::serialize(&fmt, &pcm).unwrap();

    // RIFF header, a LIST chunk, then fmt + data from the canonical file.
    let list = b"LIST\x08\x00\x00\x00INFOabcd";
    let mut with_list = Vec::new();
    with_list.extend_from_slice(&canonical[..12]);
    with_list.extend_from_slice(list);
    with_list.extend_from_slice(&canonical[12..]);
    let riff_size = (with_list.len() - 8) as u32;
    with_list[4..8].copy_from_slice(&riff_size.to_le_bytes());

    let restored = codec::decompress(&codec::compress(&with_list).unwrap()).unwrap();
    assert_eq!(restored, canonical);
}

#[test]
fn declared_payload_beyond_data_is_truncated() {
    let fmt = format(2, 16, 8000);
    let pcm = samples::to_bytes(&fmt, &sine_pairs(100, 500.0)).unwrap();
    let mut packed = codec::compress(&wav::serialize(&fmt, &pcm).unwrap()).unwrap();
    let declared = u32::from_le_bytes([packed[8], packed[9], packed[10], packed[11]]);
    packed[8..12].copy_from_slice(&(declared + 100).to_le_bytes());

    let err = codec::decompress(&packed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedInput, "{err}");
}

#[test]
fn short_container_is_truncated() {
    for len in 0..container::HEADER_LEN {
        let err = codec::decompress(&vec![0u8; len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }
}

#[test]
fn riff_wave_without_data_is_format_error() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&28u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&32000u32.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());

    let err = codec::compress(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format, "{err}");
}

#[test]
fn corrupted_bitstream_never_panics() {
    let fmt = format(2, 16, 8000);
    let pcm = samples::to_bytes(&fmt, &sine_pairs(200, 800.0)).unwrap();
    let packed = codec::compress(&wav::serialize(&fmt, &pcm).unwrap()).unwrap();

    for i in container::HEADER_LEN..packed.len() {
        let mut bad = packed.clone();
        bad[i] ^= 0x5A;
        // Either an error or some audio; never a panic.
        let _ = codec::decompress(&bad);
    }
}

#[test]
fn unsupported_bit_depth_is_rejected() {
    let fmt = format(2, 24, 8000);
    let wav_bytes = wav::serialize(&fmt, &[0u8; 12]).unwrap();
    let err = codec::compress(&wav_bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

// ---------------------------------------------------------------------------
// Interop with an independent WAV implementation
// ---------------------------------------------------------------------------

#[test]
fn hound_written_wav_roundtrips() {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let pairs = sine_pairs(2048, 12000.0);

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for p in &pairs {
            writer.write_sample(p.0 as i16).unwrap();
            writer.write_sample(p.1 as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    let wav_bytes = cursor.into_inner();

    let restored = codec::decompress(&codec::compress(&wav_bytes).unwrap()).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(restored)).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.spec().bits_per_sample, 16);
    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    let expected: Vec<i16> = pairs.iter().flat_map(|p| [p.0 as i16, p.1 as i16]).collect();
    assert_eq!(decoded, expected);
}

#[test]
fn hound_reads_mono_output() {
    let fmt = format(1, 16, 22050);
    let pairs: Vec<SamplePair> = (0..1000).map(|i| SamplePair(i % 300 - 150, 0)).collect();
    let pcm = samples::to_bytes(&fmt, &pairs).unwrap();
    let packed = codec::compress(&wav::serialize(&fmt, &pcm).unwrap()).unwrap();
    let restored = codec::decompress(&packed).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(restored)).unwrap();
    assert_eq!(reader.spec().channels, 1);
    let decoded: Vec<i64> = reader
        .samples::<i16>()
        .map(|s| i64::from(s.unwrap()))
        .collect();
    let expected: Vec<i64> = pairs.iter().map(|p| p.0).collect();
    assert_eq!(decoded, expected);
}
