//! BMP encoder

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::bitmap::Bitmap;
use crate::error::{BmpError, Result};
use crate::header::row_padding;
use crate::pixel::BmpPixel;

/// BMP encoder
#[derive(Debug, Clone, Default)]
pub struct BmpEncoder {
    /// Resolution override written to the info header
    pub pixels_per_meter: Option<(i32, i32)>,
}

impl BmpEncoder {
    /// Create new encoder with default settings
    pub fn new() -> Self {
        BmpEncoder {
            pixels_per_meter: None,
        }
    }

    /// Set the horizontal and vertical resolution
    pub fn pixels_per_meter(mut self, x: i32, y: i32) -> Self {
        self.pixels_per_meter = Some((x, y));
        self
    }

    /// Encode image to BMP data
    pub fn encode<P: BmpPixel>(&self, image: &Bitmap<P>) -> Result<Vec<u8>> {
        // Size from the live grid; the stored header may come from an untrusted file.
        let (file_header, _) = image.synced_headers()?;
        let mut output = Vec::with_capacity(file_header.file_size as usize);
        self.encode_to(&mut output, image)?;
        Ok(output)
    }

    /// Encode image to writer
    pub fn encode_to<P: BmpPixel, W: Write>(&self, writer: &mut W, image: &Bitmap<P>) -> Result<()> {
        let (file_header, mut info_header) = image.synced_headers()?;
        if let Some((x, y)) = self.pixels_per_meter {
            info_header.x_pixels_per_meter = x;
            info_header.y_pixels_per_meter = y;
        }

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            bits = P::BITS_PER_PIXEL,
            file_size = file_header.file_size,
            "encoding BMP"
        );

        file_header.write(writer)?;
        info_header.write(writer)?;

        // Color table is mandatory for depths of 8 bits or less
        if P::BITS_PER_PIXEL <= 8 {
            writer.write_all(&gray_color_table())?;
        }

        if image.width() == 0 {
            return Ok(());
        }

        let padding = row_padding(image.width(), P::BITS_PER_PIXEL);
        let mut row_buf = Vec::new();

        // Rows are stored bottom-up
        for y in (0..image.height()).rev() {
            row_buf.clear();
            for &pixel in image.row(y) {
                pixel.extend_bytes(&mut row_buf);
            }
            row_buf.resize(row_buf.len() + padding, 0);
            writer.write_all(&row_buf)?;
        }

        Ok(())
    }

    /// Encode image to a file, creating missing parent directories.
    ///
    /// The image is encoded in memory first, so an unencodable image never
    /// creates the file. A file left incomplete by a failed write is removed.
    pub fn save<P: BmpPixel>(&self, image: &Bitmap<P>, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_error = |source| BmpError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                tracing::trace!(dir = %parent.display(), "creating output directory");
                fs::create_dir_all(parent).map_err(|source| BmpError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let data = self.encode(image)?;

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        let written = writer.write_all(&data).and_then(|()| writer.flush());
        if let Err(source) = written {
            drop(writer);
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), "cannot remove incomplete file: {}", e);
            }
            return Err(io_error(source));
        }
        Ok(())
    }
}

/// 256-entry gray ramp: (blue, green, red) = index, reserved = 0.
fn gray_color_table() -> Vec<u8> {
    (0..=255u8).flat_map(|i| [i, i, i, 0]).collect()
}
