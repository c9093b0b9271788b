//! TIFF writing utilities
//!
//! Helper functions for writing TIFF files to disk: word alignment and tag
//! ordering.

use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFDEntry;
use std::collections::HashSet;
use std::io::Write;

/// Align an offset to a 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    (offset + 3) & !3
}

/// Number of padding bytes needed after `data_len` bytes
pub fn calculate_padding(data_len: u64) -> usize {
    ((4 - (data_len % 4)) % 4) as usize
}

/// Write padding bytes to align to 4-byte boundary
///
/// Returns the number of bytes written.
pub fn write_padding(writer: &mut impl Write, data_len: u64) -> TiffResult<usize> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 3][..padding])?;
    }
    Ok(padding)
}

/// Get a list of IFD entries sorted by tag number with duplicates removed
///
/// TIFF requires ascending tag order with each tag at most once. If
/// multiple entries have the same tag ID, only the last occurrence is kept.
pub fn get_unique_sorted_entries(entries: &[IFDEntry]) -> Vec<IFDEntry> {
    let mut seen_tags = HashSet::new();
    let mut unique_entries: Vec<IFDEntry> = entries.iter()
        .rev()
        .filter(|entry| seen_tags.insert(entry.tag))
        .cloned()
        .collect();

    // sort_by_key is stable, so order among distinct tags is all that changes
    unique_entries.sort_by_key(|entry| entry.tag);
    unique_entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_rounds_up_to_words() {
        assert_eq!(align_to_4_bytes(0), 0);
        assert_eq!(align_to_4_bytes(5), 8);
        assert_eq!(align_to_4_bytes(8), 8);
        assert_eq!(calculate_padding(6), 2);
    }

    #[test]
    fn later_duplicates_win_and_tags_are_sorted() {
        let entries = vec![
            IFDEntry::new(259, 3, 1, 1),
            IFDEntry::new(256, 4, 1, 10),
            IFDEntry::new(259, 3, 1, 8),
        ];
        let sorted = get_unique_sorted_entries(&entries);
        assert_eq!(sorted.iter().map(|e| e.tag).collect::<Vec<_>>(), vec![256, 259]);
        assert_eq!(sorted[1].value_offset, 8);
    }
}
