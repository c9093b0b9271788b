//! Error types for the combination engine and its front ends

use std::fmt;
use std::io;

use crate::tiff::errors::TiffError;

/// Fatal failures of a combine run
#[derive(Debug)]
pub enum CombineError {
    /// Invalid or missing arguments, unknown format or type, bad creation option
    Configuration(String),
    /// A resource could not be acquired (memory, identifier space, output target)
    Resource(String),
    /// An input raster could not be opened
    SourceOpen { path: String, error: TiffError },
    /// An input does not have the dimensions of the first input
    DimensionMismatch {
        name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Reading a row from an input failed mid-scan
    RowRead { name: String, row: usize, error: TiffError },
    /// Writing a row to the output failed mid-scan
    RowWrite { name: String, row: usize, error: TiffError },
    /// Output raster creation or finalization failed
    Tiff(TiffError),
    /// I/O error
    Io(io::Error),
    /// CSV serialization error
    Csv(csv::Error),
}

impl CombineError {
    /// Whether the error was raised while validating the run, before scanning
    pub fn is_configuration(&self) -> bool {
        matches!(self, CombineError::Configuration(_) | CombineError::DimensionMismatch { .. })
    }
}

impl fmt::Display for CombineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            CombineError::Resource(msg) => write!(f, "Resource error: {}", msg),
            CombineError::SourceOpen { path, error } => write!(f, "Unable to open {}: {}", path, error),
            CombineError::DimensionMismatch { name, expected, found } => write!(
                f, "{} is {}x{}, expected {}x{} like the first input",
                name, found.0, found.1, expected.0, expected.1),
            CombineError::RowRead { name, row, error } =>
                write!(f, "Failed to read row {} of {}: {}", row, name, error),
            CombineError::RowWrite { name, row, error } =>
                write!(f, "Failed to write row {} of {}: {}", row, name, error),
            CombineError::Tiff(e) => write!(f, "{}", e),
            CombineError::Io(e) => write!(f, "I/O error: {}", e),
            CombineError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for CombineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CombineError::SourceOpen { error, .. }
            | CombineError::RowRead { error, .. }
            | CombineError::RowWrite { error, .. } => Some(error),
            CombineError::Tiff(e) => Some(e),
            CombineError::Io(e) => Some(e),
            CombineError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TiffError> for CombineError {
    fn from(error: TiffError) -> Self {
        match error {
            TiffError::InvalidCreationOption(msg) => CombineError::Configuration(msg),
            other => CombineError::Tiff(other),
        }
    }
}

impl From<io::Error> for CombineError {
    fn from(error: io::Error) -> Self {
        CombineError::Io(error)
    }
}

impl From<csv::Error> for CombineError {
    fn from(error: csv::Error) -> Self {
        CombineError::Csv(error)
    }
}

/// Result type for combine operations
pub type CombineResult<T> = Result<T, CombineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_option_errors_are_configuration_errors() {
        let error: CombineError = TiffError::InvalidCreationOption("BIGTIFF=MAYBE".to_string()).into();
        assert!(error.is_configuration());

        let error: CombineError = TiffError::MissingDimensions.into();
        assert!(!error.is_configuration());
    }

    #[test]
    fn mismatch_names_the_offending_input() {
        let error = CombineError::DimensionMismatch {
            name: "b.tif".to_string(),
            expected: (3, 2),
            found: (4, 2),
        };
        assert!(error.is_configuration());
        assert_eq!(error.to_string(), "b.tif is 4x2, expected 3x2 like the first input");
    }
}
