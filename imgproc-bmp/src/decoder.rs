//! BMP decoder

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::bitmap::{Bitmap, DynamicBitmap, GrayImage, RgbImage};
use crate::error::{read_error, BmpError, Result};
use crate::header::{
    row_stride, Compression, FileHeader, InfoHeader, BMP_MAGIC, FILE_HEADER_SIZE,
    INFO_HEADER_SIZE,
};
use crate::pixel::{Bgr, BmpPixel};

/// BMP decoder
#[derive(Debug, Clone, Default)]
pub struct BmpDecoder {
    /// Strict mode - reject malformed headers instead of warning
    pub strict: bool,
}

impl BmpDecoder {
    /// Create new decoder
    pub fn new() -> Self {
        BmpDecoder { strict: false }
    }

    /// Enable strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Decode BMP data of either supported depth
    pub fn decode(&self, data: &[u8]) -> Result<DynamicBitmap> {
        let mut cursor = Cursor::new(data);
        self.decode_from(&mut cursor)
    }

    /// Decode BMP from reader, dispatching on the stored bit depth
    pub fn decode_from<R: Read + Seek>(&self, reader: &mut R) -> Result<DynamicBitmap> {
        let (file_header, info_header) = self.read_headers(reader)?;

        match info_header.bit_count {
            8 => self
                .read_pixels::<R, u8>(reader, file_header, info_header)
                .map(DynamicBitmap::Gray),
            24 => self
                .read_pixels::<R, Bgr>(reader, file_header, info_header)
                .map(DynamicBitmap::Color),
            other => Err(BmpError::UnsupportedBitDepth(other)),
        }
    }

    /// Decode an image whose pixel type is known up front
    pub fn decode_as<P: BmpPixel, R: Read + Seek>(&self, reader: &mut R) -> Result<Bitmap<P>> {
        let (file_header, info_header) = self.read_headers(reader)?;
        if info_header.bit_count != P::BITS_PER_PIXEL {
            return Err(BmpError::UnsupportedBitDepth(info_header.bit_count));
        }
        self.read_pixels(reader, file_header, info_header)
    }

    /// Decode an 8-bit grayscale image
    pub fn decode_gray(&self, data: &[u8]) -> Result<GrayImage> {
        self.decode_as(&mut Cursor::new(data))
    }

    /// Decode a 24-bit color image
    pub fn decode_rgb(&self, data: &[u8]) -> Result<RgbImage> {
        self.decode_as(&mut Cursor::new(data))
    }

    /// Decode a file of either supported depth
    pub fn open(&self, path: impl AsRef<Path>) -> Result<DynamicBitmap> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "opening bitmap");
        let mut reader = open_file(path)?;
        self.decode_from(&mut reader).map_err(|e| e.at_path(path))
    }

    /// Decode a file with a known pixel type
    pub fn open_as<P: BmpPixel>(&self, path: impl AsRef<Path>) -> Result<Bitmap<P>> {
        let path = path.as_ref();
        tracing::trace!(path = %path.display(), "opening bitmap");
        let mut reader = open_file(path)?;
        self.decode_as(&mut reader).map_err(|e| e.at_path(path))
    }

    /// Read and validate both header records, leaving the reader after them
    pub fn read_headers<R: Read>(&self, reader: &mut R) -> Result<(FileHeader, InfoHeader)> {
        let file_header = FileHeader::read(reader).map_err(read_error("file header"))?;
        if file_header.file_type != BMP_MAGIC {
            return Err(BmpError::InvalidMagic(file_header.file_type));
        }

        let info_header = InfoHeader::read(reader).map_err(read_error("info header"))?;

        if info_header.compression_kind() != Some(Compression::Rgb) {
            return Err(BmpError::UnsupportedCompression(info_header.compression));
        }

        if info_header.width < 0 || info_header.height == i32::MIN {
            return Err(BmpError::InvalidDimensions {
                width: info_header.width as i64,
                height: info_header.height as i64,
            });
        }

        self.check(
            info_header.header_size >= INFO_HEADER_SIZE,
            format!("info header size {} is below {}", info_header.header_size, INFO_HEADER_SIZE),
        )?;
        self.check(
            info_header.planes == 1,
            format!("plane count {} is not 1", info_header.planes),
        )?;
        self.check(
            file_header.pixel_offset >= FILE_HEADER_SIZE + INFO_HEADER_SIZE,
            format!("pixel offset {} overlaps the headers", file_header.pixel_offset),
        )?;

        Ok((file_header, info_header))
    }

    /// Fail in strict mode, warn otherwise
    fn check(&self, ok: bool, message: String) -> Result<()> {
        if ok {
            return Ok(());
        }
        if self.strict {
            return Err(BmpError::InvalidHeader(message));
        }
        tracing::warn!("tolerating malformed BMP header: {}", message);
        Ok(())
    }

    /// Read the pixel payload described by the headers
    fn read_pixels<R: Read + Seek, P: BmpPixel>(
        &self,
        reader: &mut R,
        file_header: FileHeader,
        info_header: InfoHeader,
    ) -> Result<Bitmap<P>> {
        let width = info_header.width as usize;
        let height = info_header.height.unsigned_abs() as usize;
        let top_down = info_header.is_top_down();
        let stride = row_stride(width, P::BITS_PER_PIXEL);

        tracing::debug!(
            width,
            height,
            bits = P::BITS_PER_PIXEL,
            top_down,
            "decoding BMP"
        );

        // Reject truncated payloads before allocating the grid.
        let payload_end = file_header.pixel_offset as u64 + height as u64 * stride as u64;
        let stream_len = reader.seek(SeekFrom::End(0))?;
        if stream_len < payload_end {
            return Err(BmpError::TruncatedInput {
                section: "pixel data",
            });
        }
        self.check(
            file_header.file_size as u64 >= payload_end,
            format!(
                "declared file size {} is smaller than the payload end {}",
                file_header.file_size, payload_end
            ),
        )?;

        reader.seek(SeekFrom::Start(file_header.pixel_offset as u64))?;

        let mut pixels = vec![P::default(); width * height];
        if stride > 0 && height > 0 {
            let mut row = vec![0u8; stride];
            for file_row in 0..height {
                reader
                    .read_exact(&mut row)
                    .map_err(read_error("pixel data"))?;

                // Bottom-up files store the lowest image row first.
                let y = if top_down { file_row } else { height - 1 - file_row };
                let dst = &mut pixels[y * width..(y + 1) * width];
                for (pixel, bytes) in dst.iter_mut().zip(row.chunks_exact(P::BYTES_PER_PIXEL)) {
                    *pixel = P::from_bytes(bytes);
                }
            }
        }

        Ok(Bitmap::from_parts(
            height,
            width,
            pixels,
            file_header,
            info_header,
        ))
    }

    /// Probe if data looks like a supported BMP
    pub fn probe(data: &[u8]) -> bool {
        let header_len = (FILE_HEADER_SIZE + INFO_HEADER_SIZE) as usize;
        if data.len() < header_len {
            return false;
        }
        if &data[0..2] != b"BM" {
            return false;
        }
        // biCompression lives at offset 30
        data[30..34] == [0, 0, 0, 0]
    }
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| BmpError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BmpEncoder;
    use byteorder::{LittleEndian, WriteBytesExt};

    /// Hand-built 2x2 24-bit file: bottom row blue/green, top row red/white.
    fn tiny_rgb_file() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.write_u32::<LittleEndian>(54 + 16).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(54).unwrap();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(24).unwrap();
        data.extend_from_slice(&[0; 24]);
        // Bottom row: blue, green, 2 padding bytes
        data.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0]);
        // Top row: red, white, 2 padding bytes
        data.extend_from_slice(&[0, 0, 255, 255, 255, 255, 0, 0]);
        data
    }

    #[test]
    fn test_decode_flips_rows() {
        let image = BmpDecoder::new().decode_rgb(&tiny_rgb_file()).unwrap();
        assert_eq!(image.height(), 2);
        assert_eq!(image.width(), 2);
        assert_eq!(image[(0, 0)], Bgr::new(0, 0, 255));
        assert_eq!(image[(0, 1)], Bgr::splat(255));
        assert_eq!(image[(1, 0)], Bgr::new(255, 0, 0));
        assert_eq!(image[(1, 1)], Bgr::new(0, 255, 0));
    }

    #[test]
    fn test_decode_top_down() {
        let mut data = tiny_rgb_file();
        // height = -2
        data[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        let image = BmpDecoder::new().decode_rgb(&data).unwrap();
        assert_eq!(image[(0, 0)], Bgr::new(255, 0, 0));
        assert_eq!(image[(1, 0)], Bgr::new(0, 0, 255));
        assert_eq!(image.info_header().height, -2);
    }

    #[test]
    fn test_decode_dispatch() {
        let gray = GrayImage::new(3, 3);
        let bytes = BmpEncoder::new().encode(&gray).unwrap();
        assert!(matches!(
            BmpDecoder::new().decode(&bytes).unwrap(),
            DynamicBitmap::Gray(_)
        ));
        assert!(matches!(
            BmpDecoder::new().decode(&tiny_rgb_file()).unwrap(),
            DynamicBitmap::Color(_)
        ));
    }

    #[test]
    fn test_decode_as_wrong_depth() {
        let err = BmpDecoder::new().decode_gray(&tiny_rgb_file()).unwrap_err();
        assert!(matches!(err, BmpError::UnsupportedBitDepth(24)));
    }

    #[test]
    fn test_reject_compressed() {
        let mut data = tiny_rgb_file();
        data[30..34].copy_from_slice(&1u32.to_le_bytes());
        // Drop the payload: the compression check must fire first.
        data.truncate(54);
        let err = BmpDecoder::new().decode(&data).unwrap_err();
        assert!(matches!(err, BmpError::UnsupportedCompression(1)));
    }

    #[test]
    fn test_reject_bad_magic() {
        let mut data = tiny_rgb_file();
        data[0] = b'P';
        assert!(matches!(
            BmpDecoder::new().decode(&data),
            Err(BmpError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_reject_unsupported_depth() {
        let mut data = tiny_rgb_file();
        data[28..30].copy_from_slice(&32u16.to_le_bytes());
        assert!(matches!(
            BmpDecoder::new().decode(&data),
            Err(BmpError::UnsupportedBitDepth(32))
        ));
    }

    #[test]
    fn test_truncated_headers() {
        let data = tiny_rgb_file();
        assert!(matches!(
            BmpDecoder::new().decode(&data[..10]),
            Err(BmpError::TruncatedInput {
                section: "file header"
            })
        ));
        assert!(matches!(
            BmpDecoder::new().decode(&data[..30]),
            Err(BmpError::TruncatedInput {
                section: "info header"
            })
        ));
    }

    #[test]
    fn test_truncated_pixels() {
        let data = tiny_rgb_file();
        assert!(matches!(
            BmpDecoder::new().decode(&data[..data.len() - 1]),
            Err(BmpError::TruncatedInput {
                section: "pixel data"
            })
        ));
    }

    #[test]
    fn test_honors_pixel_offset() {
        let mut data = tiny_rgb_file();
        // Insert 6 unrelated bytes between the headers and the payload.
        data.splice(54..54, [0xAA; 6]);
        data[10..14].copy_from_slice(&60u32.to_le_bytes());
        let image = BmpDecoder::new().decode_rgb(&data).unwrap();
        assert_eq!(image[(0, 0)], Bgr::new(0, 0, 255));
    }

    #[test]
    fn test_strict_mode() {
        let mut data = tiny_rgb_file();
        data[26..28].copy_from_slice(&2u16.to_le_bytes());

        assert!(BmpDecoder::new().decode(&data).is_ok());
        assert!(matches!(
            BmpDecoder::new().strict(true).decode(&data),
            Err(BmpError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_strict_file_size() {
        let mut data = tiny_rgb_file();
        data[2..6].copy_from_slice(&10u32.to_le_bytes());
        assert!(BmpDecoder::new().decode(&data).is_ok());
        assert!(BmpDecoder::new().strict(true).decode(&data).is_err());
    }

    #[test]
    fn test_negative_width() {
        let mut data = tiny_rgb_file();
        data[18..22].copy_from_slice(&(-2i32).to_le_bytes());
        assert!(matches!(
            BmpDecoder::new().decode(&data),
            Err(BmpError::InvalidDimensions { width: -2, .. })
        ));
    }

    #[test]
    fn test_height_without_positive_counterpart() {
        let mut data = tiny_rgb_file();
        data[22..26].copy_from_slice(&i32::MIN.to_le_bytes());
        let expected = i32::MIN as i64;
        for decoder in [BmpDecoder::new(), BmpDecoder::new().strict(true)] {
            assert!(matches!(
                decoder.decode(&data),
                Err(BmpError::InvalidDimensions { width: 2, height }) if height == expected
            ));
        }
    }

    #[test]
    fn test_probe() {
        assert!(BmpDecoder::probe(&tiny_rgb_file()));
        assert!(!BmpDecoder::probe(b"BM"));
        assert!(!BmpDecoder::probe(&[0x89, 0x50, 0x4E, 0x47]));

        let mut rle = tiny_rgb_file();
        rle[30] = 1;
        assert!(!BmpDecoder::probe(&rle));
    }

    #[test]
    fn test_open_missing_file_names_path() {
        let err = BmpDecoder::new()
            .open("/nonexistent/dir/missing.bmp")
            .unwrap_err();
        match err {
            BmpError::Io { path, .. } => assert!(path.ends_with("missing.bmp")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
