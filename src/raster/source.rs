//! Row-oriented raster input

use crate::raster::types::{GeoTransform, Projection, RowBuffer, SampleKind};
use crate::tiff::errors::TiffResult;

/// A single-band raster that can be read one row at a time
///
/// Rows may be requested in any order, but sequential access is what the
/// implementations are tuned for.
pub trait RasterSource {
    /// Path or name used in messages and as the default CSV column name
    fn description(&self) -> &str;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Integer or real, derived from the native storage type
    fn sample_kind(&self) -> SampleKind;

    /// Fills `buffer` with the `width` samples of row `row`
    ///
    /// `buffer` must have been allocated for this source's kind and width.
    fn read_row(&mut self, row: usize, buffer: &mut RowBuffer) -> TiffResult<()>;

    fn geo_transform(&self) -> Option<GeoTransform>;

    fn projection(&self) -> Option<&Projection>;
}
