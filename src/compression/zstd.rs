//! Handler for ZSTD compressed data

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use log::{debug, warn};

/// Lowest and highest levels accepted by the ZSTD_LEVEL creation option
pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 22;

/// ZSTD compression handler (compression code 14)
pub struct ZstdHandler {
    /// Compression level (1-22, default 3)
    compression_level: i32,
}

impl ZstdHandler {
    /// Create a new ZSTD handler with default compression level
    pub fn new() -> Self {
        ZstdHandler {
            compression_level: 3
        }
    }

    /// Create a new ZSTD handler with specified compression level
    pub fn with_level(level: i32) -> Self {
        ZstdHandler {
            compression_level: level.clamp(MIN_LEVEL, MAX_LEVEL)
        }
    }

    /// The level strips are compressed with
    pub fn level(&self) -> i32 {
        self.compression_level
    }
}

impl Default for ZstdHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>> {
        if data.is_empty() {
            return Err(TiffError::GenericError("Empty ZSTD block".to_string()));
        }

        let decompressed_data = zstd::decode_all(data).map_err(|e| {
            warn!("ZSTD decompression error: {}", e);
            TiffError::GenericError(format!("ZSTD decompression error: {}", e))
        })?;

        if decompressed_data.len() < expected_len {
            return Err(TiffError::GenericError(format!(
                "ZSTD block decoded to {} bytes, expected {}",
                decompressed_data.len(), expected_len)));
        }
        Ok(decompressed_data)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let compressed = zstd::encode_all(data, self.compression_level).map_err(|e| {
            warn!("ZSTD compression error: {}", e);
            TiffError::GenericError(format!("ZSTD compression error: {}", e))
        })?;

        debug!("ZSTD compressed {} bytes to {} at level {}",
               data.len(), compressed.len(), self.compression_level);
        Ok(compressed)
    }

    fn name(&self) -> &'static str {
        "ZSTD"
    }

    fn code(&self) -> u16 {
        compression::ZSTD
    }
}
