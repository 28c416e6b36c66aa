//! In-memory bitmap images.
//!
//! A [`Bitmap`] owns a top-down grid of pixels (row 0 is the top of the image
//! regardless of the on-disk row order) together with the two header records
//! that describe it. Headers are derived from the geometry on construction and
//! taken verbatim from the file on decode.

use std::ops::{Index, IndexMut};
use std::path::Path;

use imgproc_core::{Dims, Error as CoreError, Matrix};

use crate::decoder::BmpDecoder;
use crate::encoder::BmpEncoder;
use crate::error::{BmpError, Result};
use crate::header::{
    self, FileHeader, InfoHeader, Layout, BMP_MAGIC, COLOR_TABLE_ENTRIES, INFO_HEADER_SIZE,
};
use crate::pixel::{Bgr, BmpPixel, Channel, GrayMethod};

/// Image with pixels of type `P` and its BMP headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap<P> {
    height: usize,
    width: usize,
    pixels: Vec<P>,
    file_header: FileHeader,
    info_header: InfoHeader,
}

/// 8-bit grayscale image, written with a 256-entry gray color table.
pub type GrayImage = Bitmap<u8>;

/// 24-bit color image.
pub type RgbImage = Bitmap<Bgr>;

impl<P: BmpPixel> Bitmap<P> {
    /// Create a zero-filled image with derived headers.
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_pixels(height, width, vec![P::default(); height * width])
    }

    /// Create an image from row-major pixels.
    pub fn from_pixels(height: usize, width: usize, pixels: Vec<P>) -> Result<Self> {
        if pixels.len() != height * width {
            return Err(BmpError::InvalidArgument(format!(
                "{}x{} image needs {} pixels, got {}",
                height,
                width,
                height * width,
                pixels.len()
            )));
        }
        Ok(Self::with_pixels(height, width, pixels))
    }

    fn with_pixels(height: usize, width: usize, pixels: Vec<P>) -> Self {
        let (file_header, info_header) = header::derive(height, width, P::BITS_PER_PIXEL);
        Self {
            height,
            width,
            pixels,
            file_header,
            info_header,
        }
    }

    pub(crate) fn from_parts(
        height: usize,
        width: usize,
        pixels: Vec<P>,
        file_header: FileHeader,
        info_header: InfoHeader,
    ) -> Self {
        debug_assert_eq!(pixels.len(), height * width);
        Self {
            height,
            width,
            pixels,
            file_header,
            info_header,
        }
    }

    /// Decode an image of this pixel type from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        BmpDecoder::new().open_as(path)
    }

    /// Encode this image to a file, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        BmpEncoder::new().save(self, path)
    }

    /// Encode this image to BMP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        BmpEncoder::new().encode(self)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height and width.
    pub fn dims(&self) -> Dims {
        Dims::new(self.height, self.width)
    }

    /// Pixel at `(row, col)`, if inside the image.
    pub fn get(&self, row: usize, col: usize) -> Option<P> {
        if row < self.height && col < self.width {
            Some(self.pixels[row * self.width + col])
        } else {
            None
        }
    }

    /// Set the pixel at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, pixel: P) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(CoreError::cell_out_of_bounds(row, col, self.dims()).into());
        }
        self.pixels[row * self.width + col] = pixel;
        Ok(())
    }

    /// Borrow one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[P] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Mutably borrow one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [P] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[P]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    /// Mutable row-major pixels.
    pub fn pixels_mut(&mut self) -> &mut [P] {
        &mut self.pixels
    }

    /// Set every pixel to `pixel`.
    pub fn fill(&mut self, pixel: P) {
        self.pixels.fill(pixel);
    }

    /// Stored file header.
    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    /// Stored info header.
    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    /// Headers with geometry fields re-derived from the live grid.
    ///
    /// Width, height (always positive, rows are written bottom-up), bit depth,
    /// record size, file size, payload offset, color count and a non-zero
    /// image size are recomputed. Reserved fields, resolution and the
    /// important-color count are kept as stored.
    pub fn synced_headers(&self) -> Result<(FileHeader, InfoHeader)> {
        let layout = Layout::new(self.height, self.width, P::BITS_PER_PIXEL);

        let width = i32::try_from(self.width).ok();
        let height = i32::try_from(self.height).ok();
        let file_size = u32::try_from(layout.file_size).ok();
        let (Some(width), Some(height), Some(file_size)) = (width, height, file_size) else {
            return Err(BmpError::InvalidDimensions {
                width: self.width as i64,
                height: self.height as i64,
            });
        };

        let mut file = self.file_header;
        file.file_type = BMP_MAGIC;
        file.file_size = file_size;
        file.pixel_offset = layout.pixel_offset as u32;

        let mut info = self.info_header;
        info.header_size = INFO_HEADER_SIZE;
        info.width = width;
        info.height = height;
        info.planes = 1;
        info.bit_count = P::BITS_PER_PIXEL;
        info.compression = header::Compression::Rgb.to_u32();
        if info.image_size != 0 {
            info.image_size = layout.payload_size as u32;
        }
        // 0 is a valid way of saying "the full 256-entry table".
        let implicit_full_table = layout.colors_used == COLOR_TABLE_ENTRIES && info.colors_used == 0;
        if !implicit_full_table {
            info.colors_used = layout.colors_used;
        }

        Ok((file, info))
    }

    /// Replace the stored headers with [`Bitmap::synced_headers`].
    pub fn refresh_headers(&mut self) -> Result<()> {
        let (file, info) = self.synced_headers()?;
        self.file_header = file;
        self.info_header = info;
        Ok(())
    }
}

impl<P: BmpPixel> Index<(usize, usize)> for Bitmap<P> {
    type Output = P;

    fn index(&self, (row, col): (usize, usize)) -> &P {
        assert!(
            row < self.height && col < self.width,
            "pixel ({row}, {col}) out of bounds for {}",
            self.dims()
        );
        &self.pixels[row * self.width + col]
    }
}

impl<P: BmpPixel> IndexMut<(usize, usize)> for Bitmap<P> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut P {
        assert!(
            row < self.height && col < self.width,
            "pixel ({row}, {col}) out of bounds for {}",
            self.dims()
        );
        &mut self.pixels[row * self.width + col]
    }
}

impl GrayImage {
    /// Copy pixel values into a matrix of the same shape.
    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_fn(self.height, self.width, |y, x| {
            self.pixels[y * self.width + x] as f64
        })
    }

    /// Build an image from a matrix, clamping each cell to 0..=255 and
    /// truncating toward zero. NaN becomes 0.
    pub fn from_matrix(matrix: &Matrix) -> Self {
        let pixels = matrix
            .as_slice()
            .iter()
            .map(|&v| v.clamp(0.0, 255.0) as u8)
            .collect();
        Self::with_pixels(matrix.height(), matrix.width(), pixels)
    }

    /// Color image with the gray value on every channel.
    pub fn to_rgb(&self) -> RgbImage {
        let pixels = self.pixels.iter().map(|&v| Bgr::splat(v)).collect();
        RgbImage::with_pixels(self.height, self.width, pixels)
    }
}

impl RgbImage {
    /// Extract one channel as a grayscale image.
    pub fn channel(&self, channel: Channel) -> GrayImage {
        let pixels = self.pixels.iter().map(|p| p.channel(channel)).collect();
        GrayImage::with_pixels(self.height, self.width, pixels)
    }

    /// Split into blue, green and red grayscale images.
    pub fn channels(&self) -> (GrayImage, GrayImage, GrayImage) {
        (
            self.channel(Channel::Blue),
            self.channel(Channel::Green),
            self.channel(Channel::Red),
        )
    }

    /// Assemble a color image from blue, green and red channels of equal size.
    pub fn from_grays(blue: &GrayImage, green: &GrayImage, red: &GrayImage) -> Result<Self> {
        for other in [green, red] {
            if other.dims() != blue.dims() {
                return Err(CoreError::shape_mismatch("from_grays", blue.dims(), other.dims()).into());
            }
        }

        let pixels = blue
            .pixels
            .iter()
            .zip(&green.pixels)
            .zip(&red.pixels)
            .map(|((&b, &g), &r)| Bgr::new(b, g, r))
            .collect();
        Ok(Self::with_pixels(blue.height, blue.width, pixels))
    }

    /// Reduce to grayscale with `method`.
    pub fn to_gray(&self, method: GrayMethod) -> GrayImage {
        let pixels = self.pixels.iter().map(|&p| method.apply(p)).collect();
        GrayImage::with_pixels(self.height, self.width, pixels)
    }
}

/// A decoded image whose pixel type is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicBitmap {
    /// 8-bit grayscale.
    Gray(GrayImage),
    /// 24-bit color.
    Color(RgbImage),
}

impl DynamicBitmap {
    /// Decode a file of either supported depth.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        BmpDecoder::new().open(path)
    }

    /// Encode to a file, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        match self {
            DynamicBitmap::Gray(image) => image.save(path),
            DynamicBitmap::Color(image) => image.save(path),
        }
    }

    /// Encode to BMP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            DynamicBitmap::Gray(image) => image.to_bytes(),
            DynamicBitmap::Color(image) => image.to_bytes(),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        match self {
            DynamicBitmap::Gray(image) => image.height(),
            DynamicBitmap::Color(image) => image.height(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        match self {
            DynamicBitmap::Gray(image) => image.width(),
            DynamicBitmap::Color(image) => image.width(),
        }
    }

    /// Bits per pixel of the pixel type.
    pub fn bits_per_pixel(&self) -> u16 {
        match self {
            DynamicBitmap::Gray(_) => u8::BITS_PER_PIXEL,
            DynamicBitmap::Color(_) => Bgr::BITS_PER_PIXEL,
        }
    }

    /// Stored file header.
    pub fn file_header(&self) -> &FileHeader {
        match self {
            DynamicBitmap::Gray(image) => image.file_header(),
            DynamicBitmap::Color(image) => image.file_header(),
        }
    }

    /// Stored info header.
    pub fn info_header(&self) -> &InfoHeader {
        match self {
            DynamicBitmap::Gray(image) => image.info_header(),
            DynamicBitmap::Color(image) => image.info_header(),
        }
    }

    /// The grayscale image, if this is one.
    pub fn into_gray(self) -> Option<GrayImage> {
        match self {
            DynamicBitmap::Gray(image) => Some(image),
            DynamicBitmap::Color(_) => None,
        }
    }

    /// The color image, if this is one.
    pub fn into_rgb(self) -> Option<RgbImage> {
        match self {
            DynamicBitmap::Color(image) => Some(image),
            DynamicBitmap::Gray(_) => None,
        }
    }

    /// Color view of either variant; grayscale is replicated on all channels.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            DynamicBitmap::Gray(image) => image.to_rgb(),
            DynamicBitmap::Color(image) => image.clone(),
        }
    }
}

impl From<GrayImage> for DynamicBitmap {
    fn from(image: GrayImage) -> Self {
        DynamicBitmap::Gray(image)
    }
}

impl From<RgbImage> for DynamicBitmap {
    fn from(image: RgbImage) -> Self {
        DynamicBitmap::Color(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(height: usize, width: usize) -> RgbImage {
        let mut image = RgbImage::new(height, width);
        for y in 0..height {
            for x in 0..width {
                image[(y, x)] = Bgr::new(x as u8, y as u8, (x * y) as u8);
            }
        }
        image
    }

    #[test]
    fn test_new_gray_headers() {
        let image = GrayImage::new(3, 5);
        assert_eq!(image.pixels().len(), 15);
        assert_eq!(image.file_header().pixel_offset, 1078);
        assert_eq!(image.file_header().file_size, 1078 + 3 * 8);
        assert_eq!(image.info_header().bit_count, 8);
        assert_eq!(image.info_header().colors_used, 256);
    }

    #[test]
    fn test_new_rgb_headers() {
        let image = RgbImage::new(2, 5);
        assert_eq!(image.file_header().pixel_offset, 54);
        // 5 * 3 = 15 bytes per row, one padding byte
        assert_eq!(image.file_header().file_size, 54 + 2 * 16);
        assert_eq!(image.info_header().bit_count, 24);
    }

    #[test]
    fn test_from_pixels_length() {
        assert!(GrayImage::from_pixels(2, 2, vec![0; 4]).is_ok());
        assert!(matches!(
            GrayImage::from_pixels(2, 2, vec![0; 3]),
            Err(BmpError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_get_set() {
        let mut image = GrayImage::new(2, 3);
        image.set(1, 2, 200).unwrap();
        assert_eq!(image.get(1, 2), Some(200));
        assert_eq!(image[(1, 2)], 200);
        assert_eq!(image.row(1), &[0, 0, 200]);
        assert_eq!(image.get(2, 0), None);
        assert!(matches!(
            image.set(0, 3, 1),
            Err(BmpError::Core(CoreError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_matrix_round_trip() {
        let mut image = GrayImage::new(2, 2);
        image.pixels_mut().copy_from_slice(&[0, 64, 128, 255]);
        let matrix = image.to_matrix();
        assert_eq!(matrix[(1, 0)], 128.0);
        assert_eq!(GrayImage::from_matrix(&matrix), image);
    }

    #[test]
    fn test_from_matrix_clamps() {
        let matrix = Matrix::from_rows(vec![vec![-5.0, 12.9, 300.0, f64::NAN]]).unwrap();
        let image = GrayImage::from_matrix(&matrix);
        assert_eq!(image.pixels(), &[0, 12, 255, 0]);
    }

    #[test]
    fn test_channels_round_trip() {
        let image = gradient(3, 4);
        let (b, g, r) = image.channels();
        assert_eq!(b[(2, 3)], 3);
        assert_eq!(g[(2, 3)], 2);
        assert_eq!(r[(2, 3)], 6);
        assert_eq!(RgbImage::from_grays(&b, &g, &r).unwrap(), image);
    }

    #[test]
    fn test_from_grays_mismatch() {
        let a = GrayImage::new(2, 2);
        let b = GrayImage::new(2, 3);
        assert!(matches!(
            RgbImage::from_grays(&a, &a, &b),
            Err(BmpError::Core(CoreError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_to_gray() {
        let mut image = RgbImage::new(1, 2);
        image[(0, 0)] = Bgr::new(0, 0, 255);
        image[(0, 1)] = Bgr::new(30, 60, 90);

        let avg = image.to_gray(GrayMethod::Average);
        assert_eq!(avg.pixels(), &[85, 60]);
        assert_eq!(avg.info_header().bit_count, 8);

        let luma = image.to_gray(GrayMethod::Luma);
        assert_eq!(luma[(0, 0)], 76);
    }

    #[test]
    fn test_gray_to_rgb() {
        let mut gray = GrayImage::new(1, 1);
        gray[(0, 0)] = 42;
        assert_eq!(gray.to_rgb()[(0, 0)], Bgr::splat(42));
    }

    #[test]
    fn test_synced_headers_match_fresh() {
        let image = RgbImage::new(4, 7);
        let (file, info) = image.synced_headers().unwrap();
        assert_eq!(&file, image.file_header());
        assert_eq!(&info, image.info_header());
    }

    #[test]
    fn test_refresh_headers_fixes_stale_geometry() {
        let mut image = GrayImage::new(2, 2);
        image.info_header.height = -2;
        image.info_header.x_pixels_per_meter = 3780;
        image.file_header.file_size = 1;
        image.refresh_headers().unwrap();

        assert_eq!(image.info_header().height, 2);
        assert_eq!(image.info_header().x_pixels_per_meter, 3780);
        assert_eq!(image.file_header().file_size, 1078 + 2 * 4);
    }

    #[test]
    fn test_dynamic_accessors() {
        let dynamic = DynamicBitmap::from(GrayImage::new(3, 2));
        assert_eq!(dynamic.height(), 3);
        assert_eq!(dynamic.width(), 2);
        assert_eq!(dynamic.bits_per_pixel(), 8);
        assert_eq!(dynamic.to_rgb().dims(), Dims::new(3, 2));
        assert!(dynamic.clone().into_rgb().is_none());
        assert!(dynamic.into_gray().is_some());
    }
}
