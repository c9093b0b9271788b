//! Row-oriented raster output

use crate::raster::types::{GeoTransform, OutputDataType, Projection};
use crate::tiff::errors::TiffResult;

/// A single-band unsigned raster written one row at a time
///
/// Identifiers that do not fit `data_type()` are clamped to its maximum.
pub trait RasterSink {
    /// Path or name used in messages
    fn description(&self) -> &str;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn data_type(&self) -> OutputDataType;

    fn set_geo_transform(&mut self, transform: &GeoTransform) -> TiffResult<()>;

    fn set_projection(&mut self, projection: &Projection) -> TiffResult<()>;

    /// Stores `ids` (exactly `width` values) as row `row`
    fn write_row(&mut self, row: usize, ids: &[u32]) -> TiffResult<()>;

    /// Completes the raster; no rows may be written afterwards
    fn finalize(&mut self) -> TiffResult<()>;
}
