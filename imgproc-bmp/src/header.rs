//! BMP file and info header records.
//!
//! Both records are serialized field by field in little-endian order, never
//! through the in-memory layout of the structs.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// "BM" read as a little-endian u16.
pub const BMP_MAGIC: u16 = 0x4D42;

/// Size of the file header on disk.
pub const FILE_HEADER_SIZE: u32 = 14;

/// Size of the BITMAPINFOHEADER record on disk.
pub const INFO_HEADER_SIZE: u32 = 40;

/// Number of entries in the grayscale color table.
pub const COLOR_TABLE_ENTRIES: u32 = 256;

/// Bytes per color table entry (blue, green, red, reserved).
pub const COLOR_TABLE_ENTRY_SIZE: u32 = 4;

/// Compression kind stored in the info header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Uncompressed (BI_RGB).
    Rgb,
    /// 8-bit run-length encoding (BI_RLE8).
    Rle8,
    /// 4-bit run-length encoding (BI_RLE4).
    Rle4,
    /// Channel bit masks (BI_BITFIELDS).
    Bitfields,
    /// Embedded JPEG (BI_JPEG).
    Jpeg,
    /// Embedded PNG (BI_PNG).
    Png,
}

impl Compression {
    /// Create from the stored value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Compression::Rgb),
            1 => Some(Compression::Rle8),
            2 => Some(Compression::Rle4),
            3 => Some(Compression::Bitfields),
            4 => Some(Compression::Jpeg),
            5 => Some(Compression::Png),
            _ => None,
        }
    }

    /// Convert to the stored value.
    pub fn to_u32(self) -> u32 {
        match self {
            Compression::Rgb => 0,
            Compression::Rle8 => 1,
            Compression::Rle4 => 2,
            Compression::Bitfields => 3,
            Compression::Jpeg => 4,
            Compression::Png => 5,
        }
    }
}

/// BITMAPFILEHEADER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeader {
    /// Signature, `BMP_MAGIC` for valid files.
    pub file_type: u16,
    /// Total file size in bytes.
    pub file_size: u32,
    /// Reserved, normally 0.
    pub reserved1: u16,
    /// Reserved, normally 0.
    pub reserved2: u16,
    /// Offset of the pixel payload from the start of the file.
    pub pixel_offset: u32,
}

impl FileHeader {
    /// Read the 14-byte record.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(FileHeader {
            file_type: reader.read_u16::<LittleEndian>()?,
            file_size: reader.read_u32::<LittleEndian>()?,
            reserved1: reader.read_u16::<LittleEndian>()?,
            reserved2: reader.read_u16::<LittleEndian>()?,
            pixel_offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Write the 14-byte record.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.file_type)?;
        writer.write_u32::<LittleEndian>(self.file_size)?;
        writer.write_u16::<LittleEndian>(self.reserved1)?;
        writer.write_u16::<LittleEndian>(self.reserved2)?;
        writer.write_u32::<LittleEndian>(self.pixel_offset)?;
        Ok(())
    }
}

/// BITMAPINFOHEADER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoHeader {
    /// Size of this record (40 for BITMAPINFOHEADER).
    pub header_size: u32,
    /// Image width in pixels.
    pub width: i32,
    /// Image height in pixels; positive means bottom-up rows.
    pub height: i32,
    /// Color planes, always 1.
    pub planes: u16,
    /// Bits per pixel.
    pub bit_count: u16,
    /// Raw compression value, see [`Compression`].
    pub compression: u32,
    /// Size of the pixel payload; may be 0 for uncompressed images.
    pub image_size: u32,
    /// Horizontal resolution.
    pub x_pixels_per_meter: i32,
    /// Vertical resolution.
    pub y_pixels_per_meter: i32,
    /// Color table entries in use.
    pub colors_used: u32,
    /// Color table entries required for display.
    pub colors_important: u32,
}

impl InfoHeader {
    /// Read the 40-byte record.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(InfoHeader {
            header_size: reader.read_u32::<LittleEndian>()?,
            width: reader.read_i32::<LittleEndian>()?,
            height: reader.read_i32::<LittleEndian>()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            compression: reader.read_u32::<LittleEndian>()?,
            image_size: reader.read_u32::<LittleEndian>()?,
            x_pixels_per_meter: reader.read_i32::<LittleEndian>()?,
            y_pixels_per_meter: reader.read_i32::<LittleEndian>()?,
            colors_used: reader.read_u32::<LittleEndian>()?,
            colors_important: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Write the 40-byte record.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.header_size)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.image_size)?;
        writer.write_i32::<LittleEndian>(self.x_pixels_per_meter)?;
        writer.write_i32::<LittleEndian>(self.y_pixels_per_meter)?;
        writer.write_u32::<LittleEndian>(self.colors_used)?;
        writer.write_u32::<LittleEndian>(self.colors_important)?;
        Ok(())
    }

    /// Decoded compression kind, `None` for values outside the known set.
    pub fn compression_kind(&self) -> Option<Compression> {
        Compression::from_u32(self.compression)
    }

    /// Whether rows are stored top row first (negative height).
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }
}

/// Unpadded bytes in one pixel row.
pub fn row_bytes(width: usize, bits_per_pixel: u16) -> usize {
    width * (bits_per_pixel as usize / 8)
}

/// Zero bytes appended to each row so its length is a multiple of 4.
pub fn row_padding(width: usize, bits_per_pixel: u16) -> usize {
    (4 - row_bytes(width, bits_per_pixel) % 4) % 4
}

/// Bytes per row on disk, padding included.
pub fn row_stride(width: usize, bits_per_pixel: u16) -> usize {
    row_bytes(width, bits_per_pixel) + row_padding(width, bits_per_pixel)
}

/// Color table entries written for a bit depth.
pub fn color_table_entries(bits_per_pixel: u16) -> u32 {
    if bits_per_pixel <= 8 {
        COLOR_TABLE_ENTRIES
    } else {
        0
    }
}

/// Geometry-dependent header values for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Offset of the pixel payload.
    pub pixel_offset: u64,
    /// Size of the pixel payload.
    pub payload_size: u64,
    /// Total file size.
    pub file_size: u64,
    /// Color table entries.
    pub colors_used: u32,
}

impl Layout {
    /// Compute the layout of a `height x width` image at `bits_per_pixel`.
    pub fn new(height: usize, width: usize, bits_per_pixel: u16) -> Self {
        let colors_used = color_table_entries(bits_per_pixel);
        let pixel_offset = (FILE_HEADER_SIZE
            + INFO_HEADER_SIZE
            + colors_used * COLOR_TABLE_ENTRY_SIZE) as u64;
        let payload_size = height as u64 * row_stride(width, bits_per_pixel) as u64;

        Layout {
            pixel_offset,
            payload_size,
            file_size: pixel_offset + payload_size,
            colors_used,
        }
    }
}

/// Derive both header records for a freshly constructed image.
///
/// Values that do not fit their on-disk field saturate; the encoder rejects
/// such images before writing.
pub fn derive(height: usize, width: usize, bits_per_pixel: u16) -> (FileHeader, InfoHeader) {
    let layout = Layout::new(height, width, bits_per_pixel);

    let file_header = FileHeader {
        file_type: BMP_MAGIC,
        file_size: u32::try_from(layout.file_size).unwrap_or(u32::MAX),
        reserved1: 0,
        reserved2: 0,
        pixel_offset: layout.pixel_offset as u32,
    };

    let info_header = InfoHeader {
        header_size: INFO_HEADER_SIZE,
        width: i32::try_from(width).unwrap_or(i32::MAX),
        height: i32::try_from(height).unwrap_or(i32::MAX),
        planes: 1,
        bit_count: bits_per_pixel,
        compression: Compression::Rgb.to_u32(),
        image_size: 0,
        x_pixels_per_meter: 0,
        y_pixels_per_meter: 0,
        colors_used: layout.colors_used,
        colors_important: 0,
    };

    (file_header, info_header)
}
