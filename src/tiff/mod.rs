//! TIFF container support
//!
//! Structures and functions for reading TIFF and BigTIFF directories and
//! tag payloads, plus the streaming strip writer used for output rasters.

pub mod errors;
pub mod ifd;
pub mod types;
pub mod reader;
pub mod geotags;
pub mod writer;
pub mod constants;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use writer::{StripLayout, StripWriter, TagData};
