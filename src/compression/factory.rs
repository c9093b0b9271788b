//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a handler able to decode blocks tagged with `code`
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match u16::try_from(code) {
            Ok(compression::NONE) => Ok(Box::new(UncompressedHandler)),
            Ok(compression::DEFLATE) => Ok(Box::new(AdobeDeflateHandler::new())),
            Ok(compression::DEFLATE_LEGACY) => Ok(Box::new(AdobeDeflateHandler::legacy())),
            Ok(compression::ZSTD) => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }

    /// Get a handler by COMPRESS creation option value
    ///
    /// `zstd_level` only affects the ZSTD handler.
    pub fn get_handler_by_name(name: &str, zstd_level: i32) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" => Ok(Box::new(AdobeDeflateHandler::new())),
            "zstd" => Ok(Box::new(ZstdHandler::with_level(zstd_level))),
            _ => Err(TiffError::InvalidCreationOption(format!("COMPRESS={} (expected NONE, DEFLATE or ZSTD)", name)))
        }
    }
}
