//! Outline shapes drawn onto a color image

use imgproc_bmp::{Bgr, GrayImage, RgbImage};
use imgproc_core::Dims;

use crate::{DrawError, Result};

/// Shape to outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned rectangle anchored at its top-left corner
    Rectangle {
        /// Top row
        top: usize,
        /// Left column
        left: usize,
        /// Rows covered
        height: usize,
        /// Columns covered
        width: usize,
    },
    /// Circle around a center that may lie outside the image.
    ///
    /// Drawn as a ring `thickness` pixels wide, not as a filled disc: a pixel
    /// at squared distance `d2` from the center is painted when
    /// `(radius - thickness)^2 < d2 <= radius^2`. Only a thickness of at least
    /// `radius` fills the whole disc.
    Circle {
        /// Center row
        center_row: i64,
        /// Center column
        center_col: i64,
        /// Outer radius in pixels
        radius: u32,
    },
}

/// Draws shape outlines into an owned color image.
///
/// ```
/// use imgproc_bmp::{Bgr, RgbImage};
/// use imgproc_draw::{OutlineRenderer, Shape};
///
/// let mut renderer = OutlineRenderer::new(RgbImage::new(10, 10))
///     .color(Bgr::new(0, 0, 255))
///     .thickness(2);
/// renderer.render(&Shape::Rectangle { top: 1, left: 1, height: 8, width: 8 })?;
/// let image = renderer.into_image();
/// assert_eq!(image[(1, 1)], Bgr::new(0, 0, 255));
/// assert_eq!(image[(5, 5)], Bgr::default());
/// # Ok::<(), imgproc_draw::DrawError>(())
/// ```
#[derive(Debug, Clone)]
pub struct OutlineRenderer {
    image: RgbImage,
    color: Bgr,
    thickness: u32,
}

impl OutlineRenderer {
    /// Create a renderer drawing black one-pixel lines
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            color: Bgr::default(),
            thickness: 1,
        }
    }

    /// Create a renderer over a color copy of a gray image
    pub fn from_gray(image: &GrayImage) -> Self {
        Self::new(image.to_rgb())
    }

    /// Set line color
    pub fn color(mut self, color: Bgr) -> Self {
        self.color = color;
        self
    }

    /// Set line thickness in pixels
    pub fn thickness(mut self, thickness: u32) -> Self {
        self.thickness = thickness;
        self
    }

    /// Image drawn so far
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Take the image back
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Draw one shape
    pub fn render(&mut self, shape: &Shape) -> Result<()> {
        if self.thickness == 0 {
            return Err(DrawError::InvalidShape(
                "thickness must be greater than 0".into(),
            ));
        }

        tracing::debug!(?shape, thickness = self.thickness, "rendering outline");

        match *shape {
            Shape::Rectangle {
                top,
                left,
                height,
                width,
            } => self.render_rectangle(top, left, height, width),
            Shape::Circle {
                center_row,
                center_col,
                radius,
            } => {
                self.render_circle(center_row, center_col, radius);
                Ok(())
            }
        }
    }

    fn render_rectangle(&mut self, top: usize, left: usize, height: usize, width: usize) -> Result<()> {
        if height == 0 || width == 0 {
            return Err(DrawError::InvalidShape(format!(
                "rectangle {height}x{width} has no area"
            )));
        }
        let thickness = self.thickness as usize;
        if thickness >= height || thickness >= width {
            return Err(DrawError::InvalidShape(format!(
                "thickness {thickness} must be less than rectangle {height}x{width}"
            )));
        }

        let extent = self.image.dims();
        let fits = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if !fits(top, height, extent.height) || !fits(left, width, extent.width) {
            return Err(DrawError::OutOfBounds {
                top,
                left,
                request: Dims::new(height, width),
                extent,
            });
        }

        for dy in 0..height {
            let edge_row = dy < thickness || height - 1 - dy < thickness;
            let row = &mut self.image.row_mut(top + dy)[left..left + width];
            for (dx, pixel) in row.iter_mut().enumerate() {
                if edge_row || dx < thickness || width - 1 - dx < thickness {
                    *pixel = self.color;
                }
            }
        }

        Ok(())
    }

    fn render_circle(&mut self, center_row: i64, center_col: i64, radius: u32) {
        // i128 holds every squared distance reachable from an i64 center and u32 radius.
        let (center_row, center_col) = (center_row as i128, center_col as i128);
        let radius = radius as i128;
        let outer = radius * radius;
        // A thickness reaching the center fills the disc.
        let inner = radius - self.thickness as i128;
        let inner = if inner <= 0 { -1 } else { inner * inner };

        let height = self.image.height() as i128;
        let width = self.image.width() as i128;
        let rows = (center_row - radius).max(0)..=(center_row + radius).min(height - 1);
        let cols = (center_col - radius).max(0)..=(center_col + radius).min(width - 1);

        for y in rows {
            let row = self.image.row_mut(y as usize);
            for x in cols.clone() {
                let (dy, dx) = (y - center_row, x - center_col);
                let d2 = dy * dy + dx * dx;
                if d2 > inner && d2 <= outer {
                    row[x as usize] = self.color;
                }
            }
        }
    }
}
