//! Outline rendering for imgproc bitmaps
//!
//! Draws hollow rectangles and rings onto a color image.

mod error;
mod outline;

pub use error::*;
pub use outline::*;

/// Result type for drawing operations
pub type Result<T> = std::result::Result<T, DrawError>;
