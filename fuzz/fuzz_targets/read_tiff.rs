#![no_main]
use libfuzzer_sys::fuzz_target;

use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = fijio::ImageJFile::from_reader(Cursor::new(data));
});
