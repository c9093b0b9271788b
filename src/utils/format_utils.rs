//! TIFF format utilities
//!
//! Utilities for working with TIFF format specifics like header version
//! detection and the BigTIFF decision on the writing side.

use log::debug;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::header;
use crate::tiff::validation;

/// Classic TIFF offsets are 32 bits; files past this size need BigTIFF
pub const CLASSIC_TIFF_LIMIT: u64 = u32::MAX as u64;

/// Detects whether a file is TIFF or BigTIFF based on its version number
///
/// # Arguments
/// * `reader` - The seekable reader to use, positioned after the byte order mark
/// * `byte_order_handler` - Handler for the file's byte order
///
/// # Returns
/// A tuple with (is_big_tiff, version_number)
pub fn detect_tiff_format(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<(bool, u16)> {
    let version = byte_order_handler.read_u16(reader)?;
    debug!("TIFF version: {}", version);

    let is_big_tiff = match version {
        header::BIG_TIFF_VERSION => {
            debug!("Detected BigTIFF format");
            validation::validate_bigtiff_header(reader, byte_order_handler)?;
            true
        },
        header::TIFF_VERSION => {
            debug!("Detected standard TIFF format");
            false
        },
        _ => return Err(TiffError::UnsupportedVersion(version)),
    };

    Ok((is_big_tiff, version))
}

/// Decides whether an output of roughly `estimated_bytes` must be BigTIFF
///
/// Leaves a 10% margin for directory and georeferencing data.
pub fn needs_big_tiff(estimated_bytes: u64) -> bool {
    estimated_bytes.saturating_add(estimated_bytes / 10) > CLASSIC_TIFF_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_rasters_stay_classic() {
        assert!(!needs_big_tiff(1024 * 1024));
        assert!(needs_big_tiff(4 * 1024 * 1024 * 1024));
    }
}
