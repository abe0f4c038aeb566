#![no_main]
use libfuzzer_sys::fuzz_target;
use wavhuff::codec;
use wavhuff::huffman::{self, FrequencyTable};

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let _ = codec::decompress(data);
    let _ = codec::inspect(data);

    // Also fuzz the payload layer without a container header.
    if let Ok((table, used)) = FrequencyTable::read_from(data) {
        let _ = huffman::decode_values(&table, &data[used..]);
    }
});
