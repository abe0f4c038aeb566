#![no_main]
use libfuzzer_sys::fuzz_target;
use wavhuff::codec;
use wavhuff::wav::{self, AudioFormat};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Use first byte as layout selector.
    let flags = data[0];
    let channel_count = 1 + u16::from(flags & 1);
    let bits_per_sample = match (flags >> 1) % 3 {
        0 => 8,
        1 => 16,
        _ => 32,
    };
    let fmt = AudioFormat {
        channel_count,
        bits_per_sample,
        sample_rate: 8000,
    };

    // Trim the PCM to whole frames.
    let frame_len = usize::from(fmt.block_align().unwrap());
    let pcm = &data[1..];
    let pcm = &pcm[..pcm.len() - pcm.len() % frame_len];

    let wav_bytes = wav::serialize(&fmt, pcm).unwrap();
    let packed = codec::compress(&wav_bytes).unwrap();
    let restored = codec::decompress(&packed).unwrap();
    assert_eq!(restored, wav_bytes);
});
