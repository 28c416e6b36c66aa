//! Drawing errors

use imgproc_core::Dims;
use thiserror::Error;

/// Errors from shape rendering
#[derive(Error, Debug)]
pub enum DrawError {
    /// Shape parameters that cannot be drawn
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Shape extends past the image
    #[error("shape {request} at ({top}, {left}) exceeds {extent} image")]
    OutOfBounds {
        /// Top row of the shape
        top: usize,
        /// Left column of the shape
        left: usize,
        /// Shape size
        request: Dims,
        /// Image size
        extent: Dims,
    },
}

impl From<DrawError> for imgproc_core::Error {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::InvalidShape(msg) => imgproc_core::Error::InvalidArgument(msg),
            DrawError::OutOfBounds {
                top,
                left,
                request,
                extent,
            } => imgproc_core::Error::OutOfBounds {
                row: top,
                col: left,
                request,
                extent,
            },
        }
    }
}
