//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for the codecs applied to individual strips and tiles
pub trait CompressionHandler: Send + Sync {
    /// Decompress one block
    ///
    /// `expected_len` is the decoded size implied by the image layout; it is
    /// used as a capacity hint and to reject truncated blocks.
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>>;

    /// Compress one block
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Get the value written to the Compression tag
    fn code(&self) -> u16;
}
