#![no_main]

use imgproc_bmp::BmpDecoder;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);
    if let Ok((_, info)) = BmpDecoder::new().read_headers(&mut cursor) {
        let _ = info.compression_kind();
        let _ = info.is_top_down();
    }
    let _ = BmpDecoder::probe(data);
});
