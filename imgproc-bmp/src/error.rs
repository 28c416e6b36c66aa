//! BMP codec error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for BMP operations.
pub type Result<T> = std::result::Result<T, BmpError>;

/// BMP codec errors.
#[derive(Error, Debug)]
pub enum BmpError {
    /// Stream does not start with the "BM" signature.
    #[error("Invalid BMP magic number: {0:#06x}")]
    InvalidMagic(u16),

    /// Compression kind other than BI_RGB.
    #[error("Unsupported compression: {0} (only uncompressed BI_RGB is supported)")]
    UnsupportedCompression(u32),

    /// Bit depth other than 8 (grayscale) or 24 (color).
    #[error("Unsupported bit depth: {0} (expected 8 or 24)")]
    UnsupportedBitDepth(u16),

    /// Stream ended before the expected bytes were read.
    #[error("Truncated input while reading {section}")]
    TruncatedInput {
        /// Section being read.
        section: &'static str,
    },

    /// Dimensions that cannot be represented in a BMP file.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Declared or requested width.
        width: i64,
        /// Declared or requested height.
        height: i64,
    },

    /// Header field rejected by strict decoding.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid argument, e.g. an unknown grayscale method.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cannot open or create a file or directory.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error on an in-memory or caller-provided stream.
    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// Error from the core data model (shape or bounds).
    #[error(transparent)]
    Core(#[from] imgproc_core::Error),
}

impl BmpError {
    /// Attach `path` to a path-less stream error.
    pub(crate) fn at_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            BmpError::Stream(source) => BmpError::Io {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}

/// Map a failed read to `TruncatedInput` when the stream ran dry.
pub(crate) fn read_error(section: &'static str) -> impl FnOnce(std::io::Error) -> BmpError {
    move |err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            BmpError::TruncatedInput { section }
        } else {
            BmpError::Stream(err)
        }
    }
}

impl From<BmpError> for imgproc_core::Error {
    fn from(err: BmpError) -> Self {
        use imgproc_core::Error as CoreError;

        match err {
            BmpError::InvalidMagic(_)
            | BmpError::UnsupportedCompression(_)
            | BmpError::UnsupportedBitDepth(_)
            | BmpError::InvalidHeader(_) => CoreError::UnsupportedFormat(err.to_string()),
            BmpError::TruncatedInput { section } => CoreError::TruncatedInput { section },
            BmpError::InvalidDimensions { .. } | BmpError::InvalidArgument(_) => {
                CoreError::InvalidArgument(err.to_string())
            }
            BmpError::Io { path, source } => CoreError::Io { path, source },
            BmpError::Stream(source) => CoreError::Io {
                path: PathBuf::from("<stream>"),
                source,
            },
            BmpError::Core(inner) => inner,
        }
    }
}
