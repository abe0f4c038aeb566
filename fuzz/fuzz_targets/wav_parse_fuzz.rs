#![no_main]
use libfuzzer_sys::fuzz_target;
use wavhuff::{codec, wav};

fuzz_target!(|data: &[u8]| {
    if let Ok(audio) = wav::parse(data) {
        // Anything the parser accepts and the codec encodes must decode back.
        if let Ok((packed, _)) = codec::encode_audio(&audio) {
            let (restored, _) = codec::decode_audio(&packed).unwrap();
            assert_eq!(restored, audio);
        }
    }
});
