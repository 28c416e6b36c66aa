#![no_main]

use imgproc_bmp::{BmpDecoder, DynamicBitmap};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must never panic, strict or not
    let _ = BmpDecoder::new().strict(true).decode(data);

    if let Ok(image) = BmpDecoder::new().decode(data) {
        let _ = image.width();
        let _ = image.height();

        // Anything we accept must survive a re-encode
        if let Ok(bytes) = image.to_bytes() {
            let again: DynamicBitmap = BmpDecoder::new()
                .decode(&bytes)
                .expect("re-encoded image must decode");
            assert_eq!(again.to_rgb().pixels(), image.to_rgb().pixels());
        }
    }
});
