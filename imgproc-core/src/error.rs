//! Error types for the imgproc library.
//!
//! Every failure the library can report maps onto one of the kinds below.
//! Format-specific crates define richer error enums and convert into this one.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for imgproc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Height and width of a two-dimensional grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl Dims {
    /// Create a new dimension pair.
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Main error type for the imgproc library.
#[derive(Error, Debug)]
pub enum Error {
    /// Operand shapes are incompatible for the requested operation.
    #[error("Shape mismatch in {op}: {left} and {right}")]
    ShapeMismatch {
        /// Operation name.
        op: &'static str,
        /// Left operand dimensions (height x width).
        left: Dims,
        /// Right operand dimensions (height x width).
        right: Dims,
    },

    /// A region or coordinate request exceeds the grid extent.
    #[error("Out of bounds: {request} at ({row}, {col}) in {extent} grid")]
    OutOfBounds {
        /// Requested row offset.
        row: usize,
        /// Requested column offset.
        col: usize,
        /// Requested region size (1x1 for single cells).
        request: Dims,
        /// Extent of the grid being accessed.
        extent: Dims,
    },

    /// Rows of a literal 2-D list have unequal lengths.
    #[error("Ragged rows: row {row} has {actual} elements, expected {expected}")]
    RaggedRows {
        /// Index of the first offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },

    /// Compressed or otherwise unsupported payload.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Stream ended before the expected bytes were read.
    #[error("Truncated input while reading {section}")]
    TruncatedInput {
        /// Section of the stream being read.
        section: &'static str,
    },

    /// Cannot open or create a file or directory.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid argument, e.g. an unrecognized conversion mode.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Shape mismatch between two grids.
    pub fn shape_mismatch(op: &'static str, left: Dims, right: Dims) -> Self {
        Error::ShapeMismatch { op, left, right }
    }

    /// Single-cell access outside the grid.
    pub fn cell_out_of_bounds(row: usize, col: usize, extent: Dims) -> Self {
        Error::OutOfBounds {
            row,
            col,
            request: Dims::new(1, 1),
            extent,
        }
    }
}
