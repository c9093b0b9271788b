//! Handler for Adobe Deflate compressed data

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Adobe Deflate (Zlib) compression handler
///
/// Decodes both the standard code 8 and the pre-standard code 32946, which
/// carry identical zlib streams.
pub struct AdobeDeflateHandler {
    code: u16,
}

impl AdobeDeflateHandler {
    /// Handler for the standard code 8
    pub fn new() -> Self {
        AdobeDeflateHandler { code: compression::DEFLATE }
    }

    /// Handler for files tagged with the legacy code 32946
    pub fn legacy() -> Self {
        AdobeDeflateHandler { code: compression::DEFLATE_LEGACY }
    }
}

impl Default for AdobeDeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::with_capacity(expected_len);
        decoder.read_to_end(&mut decompressed_data).map_err(TiffError::IoError)?;

        if decompressed_data.len() < expected_len {
            return Err(TiffError::GenericError(format!(
                "Deflate block decoded to {} bytes, expected {}",
                decompressed_data.len(), expected_len)));
        }
        Ok(decompressed_data)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).map_err(TiffError::IoError)?;
        encoder.finish().map_err(TiffError::IoError)
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u16 {
        self.code
    }
}
