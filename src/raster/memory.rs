//! In-memory rasters
//!
//! The MEM driver: grids held in vectors, for library callers that already
//! have their data loaded and for tests.

use crate::raster::sink::RasterSink;
use crate::raster::source::RasterSource;
use crate::raster::types::{GeoTransform, OutputDataType, Projection, RowBuffer, SampleKind};
use crate::tiff::errors::{TiffError, TiffResult};

/// Row-major grid of integer or real samples
pub struct MemRasterSource {
    name: String,
    width: usize,
    height: usize,
    data: RowBuffer,
    geo_transform: Option<GeoTransform>,
    projection: Option<Projection>,
}

impl MemRasterSource {
    /// Integer grid; `values.len()` must equal `width * height`
    pub fn from_integers(name: &str, width: usize, height: usize, values: Vec<i64>) -> TiffResult<Self> {
        Self::new(name, width, height, RowBuffer::Integer(values))
    }

    /// Real grid; `values.len()` must equal `width * height`
    pub fn from_reals(name: &str, width: usize, height: usize, values: Vec<f64>) -> TiffResult<Self> {
        Self::new(name, width, height, RowBuffer::Real(values))
    }

    fn new(name: &str, width: usize, height: usize, data: RowBuffer) -> TiffResult<Self> {
        if data.len() != width * height {
            return Err(TiffError::RowLengthMismatch { expected: width * height, found: data.len() });
        }
        Ok(Self {
            name: name.to_string(),
            width,
            height,
            data,
            geo_transform: None,
            projection: None,
        })
    }

    pub fn with_geo_transform(mut self, transform: GeoTransform) -> Self {
        self.geo_transform = Some(transform);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }
}

impl RasterSource for MemRasterSource {
    fn description(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sample_kind(&self) -> SampleKind {
        self.data.kind()
    }

    fn read_row(&mut self, row: usize, buffer: &mut RowBuffer) -> TiffResult<()> {
        if row >= self.height {
            return Err(TiffError::RowOutOfBounds { row, height: self.height });
        }

        let range = row * self.width..(row + 1) * self.width;
        match (&self.data, buffer) {
            (RowBuffer::Integer(data), RowBuffer::Integer(out)) if out.len() == self.width => {
                out.copy_from_slice(&data[range]);
            }
            (RowBuffer::Real(data), RowBuffer::Real(out)) if out.len() == self.width => {
                out.copy_from_slice(&data[range]);
            }
            (_, out) => {
                return Err(TiffError::GenericError(format!(
                    "{} row buffer of {} samples cannot hold a {} row of {}",
                    out.kind(), out.len(), self.data.kind(), self.width)));
            }
        }

        Ok(())
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        self.geo_transform
    }

    fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }
}

/// Identifier grid kept in memory, stored as the output type would store it
pub struct MemRasterSink {
    name: String,
    width: usize,
    height: usize,
    data_type: OutputDataType,
    values: Vec<u32>,
    rows_written: Vec<bool>,
    geo_transform: Option<GeoTransform>,
    projection: Option<Projection>,
    finalized: bool,
}

impl MemRasterSink {
    pub fn new(name: &str, width: usize, height: usize, data_type: OutputDataType) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            data_type,
            values: vec![0; width * height],
            rows_written: vec![false; height],
            geo_transform: None,
            projection: None,
            finalized: false,
        }
    }

    /// The stored values of row `row`
    pub fn row(&self, row: usize) -> &[u32] {
        &self.values[row * self.width..(row + 1) * self.width]
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written.iter().filter(|&&written| written).count()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn stored_geo_transform(&self) -> Option<GeoTransform> {
        self.geo_transform
    }

    pub fn stored_projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }
}

impl RasterSink for MemRasterSink {
    fn description(&self) -> &str {
        &self.name
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn data_type(&self) -> OutputDataType {
        self.data_type
    }

    fn set_geo_transform(&mut self, transform: &GeoTransform) -> TiffResult<()> {
        self.geo_transform = Some(*transform);
        Ok(())
    }

    fn set_projection(&mut self, projection: &Projection) -> TiffResult<()> {
        self.projection = Some(projection.clone());
        Ok(())
    }

    fn write_row(&mut self, row: usize, ids: &[u32]) -> TiffResult<()> {
        if self.finalized {
            return Err(TiffError::GenericError(format!("{} is already finalized", self.name)));
        }
        if row >= self.height {
            return Err(TiffError::RowOutOfBounds { row, height: self.height });
        }
        if ids.len() != self.width {
            return Err(TiffError::RowLengthMismatch { expected: self.width, found: ids.len() });
        }

        let data_type = self.data_type;
        let target = &mut self.values[row * self.width..(row + 1) * self.width];
        for (slot, &id) in target.iter_mut().zip(ids) {
            *slot = data_type.clamp(id);
        }
        self.rows_written[row] = true;
        Ok(())
    }

    fn finalize(&mut self) -> TiffResult<()> {
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_rejects_wrong_sized_grids() {
        assert!(MemRasterSource::from_integers("a", 2, 2, vec![1, 2, 3]).is_err());
    }

    #[test]
    fn source_reads_rows_of_its_kind() {
        let mut source = MemRasterSource::from_reals("r", 2, 2, vec![0.5, 1.5, 2.5, 3.5]).unwrap();
        let mut buffer = RowBuffer::allocate(SampleKind::Real, 2).unwrap();
        source.read_row(1, &mut buffer).unwrap();
        assert_eq!(buffer, RowBuffer::Real(vec![2.5, 3.5]));

        let mut wrong = RowBuffer::allocate(SampleKind::Integer, 2).unwrap();
        assert!(source.read_row(0, &mut wrong).is_err());
        assert!(source.read_row(2, &mut buffer).is_err());
    }

    #[test]
    fn sink_clamps_to_output_type() {
        let mut sink = MemRasterSink::new("out", 3, 1, OutputDataType::Byte);
        sink.write_row(0, &[0, 255, 300]).unwrap();
        sink.finalize().unwrap();

        assert_eq!(sink.row(0), &[0, 255, 255]);
        assert!(sink.is_finalized());
        assert!(sink.write_row(0, &[0, 0, 0]).is_err());
    }
}
