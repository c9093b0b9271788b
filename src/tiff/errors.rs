//! Error types for the TIFF container, codec and raster driver layer

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Image dimensions not found
    MissingDimensions,
    /// Sample layout the decoder cannot handle (bit depth, predictor, ...)
    UnsupportedLayout(String),
    /// Row index past the end of the raster
    RowOutOfBounds { row: usize, height: usize },
    /// Row buffer does not match the raster width
    RowLengthMismatch { expected: usize, found: usize },
    /// Rows must be written in increasing order without gaps
    OutOfOrderRow { expected: usize, found: usize },
    /// Creation option with a bad name or value
    InvalidCreationOption(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::UnsupportedLayout(msg) => write!(f, "Unsupported raster layout: {}", msg),
            TiffError::RowOutOfBounds { row, height } =>
                write!(f, "Row {} is outside a raster of height {}", row, height),
            TiffError::RowLengthMismatch { expected, found } =>
                write!(f, "Row buffer holds {} samples, raster width is {}", found, expected),
            TiffError::OutOfOrderRow { expected, found } =>
                write!(f, "Row {} written out of order (expected row {})", found, expected),
            TiffError::InvalidCreationOption(msg) => write!(f, "Invalid creation option: {}", msg),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}
