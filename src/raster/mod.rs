//! Raster access
//!
//! Row-oriented source and sink abstractions, with GeoTIFF and in-memory
//! implementations and the driver factory that picks between them.

pub mod types;
pub mod source;
pub mod sink;
pub mod decode;
pub mod driver;
pub mod tiff_source;
pub mod tiff_sink;
pub mod memory;

pub use driver::{available_drivers, Driver, DriverInfo, RasterDriverFactory};
pub use memory::{MemRasterSink, MemRasterSource};
pub use sink::RasterSink;
pub use source::RasterSource;
pub use tiff_sink::TiffRasterSink;
pub use tiff_source::TiffRasterSource;
pub use types::{GeoTransform, OutputDataType, Projection, RowBuffer, SampleKind};
