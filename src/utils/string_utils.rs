//! String utility functions
//!
//! Utilities for working with strings and text data.

use std::path::Path;

/// Trims trailing null characters from a byte buffer
pub fn trim_trailing_nulls(buffer: &mut Vec<u8>) {
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
}

/// Returns the file name of `path` without directories or extension
///
/// Falls back to the path as given when it has no usable stem.
pub fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_nulls_are_removed() {
        let mut buffer = b"WGS 84|\0\0".to_vec();
        trim_trailing_nulls(&mut buffer);
        assert_eq!(buffer, b"WGS 84|");
    }

    #[test]
    fn stem_drops_directory_and_extension() {
        assert_eq!(file_stem("data/landcover.tif"), "landcover");
        assert_eq!(file_stem("soil"), "soil");
        assert_eq!(file_stem("/tmp/a.b.tif"), "a.b");
    }
}
