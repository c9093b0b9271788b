//! IFD utilities
//!
//! Utilities for working with Image File Directories (IFDs) in TIFF files.

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::TiffResult;

/// Size of an IFD offset (and of an entry's value field)
pub fn offset_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 8 } else { 4 }
}

/// Size of a single IFD entry
pub fn entry_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 20 } else { 12 }
}

/// Reads an IFD offset (the first one in the header or a next-IFD link)
///
/// # Arguments
/// * `reader` - The seekable reader to use
/// * `is_big_tiff` - Whether the file is in BigTIFF format
/// * `byte_order_handler` - Handler for the file's byte order
///
/// # Returns
/// The offset, or 0 if there are no more IFDs
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TiffResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Calculates the size of an IFD in bytes, next-IFD offset included
///
/// # Arguments
/// * `entry_count` - Number of entries in the IFD
/// * `is_big_tiff` - Whether the file is in BigTIFF format
pub fn calculate_ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry) + 8 (next IFD offset)
        8 + (entry_size(true) * entry_count as u64) + 8
    } else {
        // 2 (entry count) + 12 (each entry) + 4 (next IFD offset)
        2 + (entry_size(false) * entry_count as u64) + 4
    }
}
