#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // the first four bytes pick the byte counts, the rest is the block
    if data.len() < 4 {
        return;
    }
    let (head, block) = data.split_at(4);
    let counts: Vec<u32> = head.iter().map(|&b| u32::from(b) * 4).collect();
    let _ = fijio::metadata::decode_tags(block, &counts);
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = fijio::ImageJFile::from_description(text);
    }
});
