//! Uncompressed BMP codec for the imgproc library.
//!
//! Windows bitmap files carry a 14-byte file header, a 40-byte info header,
//! an optional color table, and rows of pixels stored bottom-up with each
//! row padded to a multiple of 4 bytes.
//!
//! # Features
//!
//! - 8-bit grayscale with a 256-entry gray color table ([`GrayImage`])
//! - 24-bit color ([`RgbImage`])
//! - Bottom-up and top-down row order on decode
//! - Conversions to and from [`imgproc_core::Matrix`], channel split/merge,
//!   and color to grayscale reduction
//!
//! Compressed payloads (RLE, bit fields, embedded JPEG/PNG) and other bit
//! depths are rejected.
//!
//! # Example
//!
//! ```no_run
//! use imgproc_bmp::{BmpDecoder, GrayMethod, RgbImage};
//!
//! let image = RgbImage::open("input/photo.bmp")?;
//! let gray = image.to_gray(GrayMethod::Luma);
//! gray.save("output/photo_gray.bmp")?;
//!
//! let bytes = std::fs::read("input/photo.bmp")?;
//! let dynamic = BmpDecoder::new().strict(true).decode(&bytes)?;
//! println!("{}x{} @ {} bpp", dynamic.width(), dynamic.height(), dynamic.bits_per_pixel());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bitmap;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod pixel;

pub use bitmap::{Bitmap, DynamicBitmap, GrayImage, RgbImage};
pub use decoder::BmpDecoder;
pub use encoder::BmpEncoder;
pub use error::{BmpError, Result};
pub use header::{Compression, FileHeader, InfoHeader};
pub use pixel::{Bgr, BmpPixel, Channel, GrayMethod};

/// Check whether `data` starts with an uncompressed BMP header.
pub fn is_bmp(data: &[u8]) -> bool {
    BmpDecoder::probe(data)
}
