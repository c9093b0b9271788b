//! Scanline combiner
//!
//! Walks the inputs row by row, registering the combination found at every
//! pixel and, when an output is configured, writing each pixel's
//! identifier to it.

use log::{debug, info, warn};

use crate::combine::key::KeyEncoder;
use crate::combine::registry::CombinationRegistry;
use crate::combine::sample::Sample;
use crate::errors::{CombineError, CombineResult};
use crate::raster::sink::RasterSink;
use crate::raster::source::RasterSource;
use crate::raster::types::{OutputDataType, RowBuffer};
use crate::utils::progress::ProgressSink;

/// More combinations were found than the output type can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeOverflow {
    pub data_type: OutputDataType,
    /// Identifier the next combination would have received
    pub next_id: u64,
    /// Number of values the output type can hold
    pub limit: u64,
}

/// Outcome of a completed scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub width: usize,
    pub height: usize,
    pub pixels: u64,
    pub combinations: usize,
    pub range_overflow: Option<RangeOverflow>,
}

/// Row-by-row overlay of co-registered rasters
pub struct ScanlineCombiner<'a> {
    sources: Vec<Box<dyn RasterSource + 'a>>,
    sink: Option<&'a mut dyn RasterSink>,
    progress: Option<&'a mut dyn ProgressSink>,
    width: usize,
    height: usize,
}

impl<'a> ScanlineCombiner<'a> {
    /// Takes ownership of the inputs, checking they all share the first
    /// input's dimensions
    pub fn new(sources: Vec<Box<dyn RasterSource + 'a>>) -> CombineResult<Self> {
        let first = sources.first().ok_or_else(|| {
            CombineError::Configuration("at least one input raster is required".to_string())
        })?;
        let (width, height) = (first.width(), first.height());

        for source in &sources[1..] {
            if (source.width(), source.height()) != (width, height) {
                return Err(CombineError::DimensionMismatch {
                    name: source.description().to_string(),
                    expected: (width, height),
                    found: (source.width(), source.height()),
                });
            }
        }

        Ok(ScanlineCombiner {
            sources,
            sink: None,
            progress: None,
            width,
            height,
        })
    }

    /// Writes identifiers to `sink`, which must match the inputs' dimensions
    pub fn with_sink(mut self, sink: &'a mut dyn RasterSink) -> CombineResult<Self> {
        if (sink.width(), sink.height()) != (self.width, self.height) {
            return Err(CombineError::DimensionMismatch {
                name: sink.description().to_string(),
                expected: (self.width, self.height),
                found: (sink.width(), sink.height()),
            });
        }
        self.sink = Some(sink);
        Ok(self)
    }

    pub fn with_progress(mut self, progress: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Scans every row, registering combinations in `registry`
    ///
    /// Any read or write failure aborts the scan. The output, if any, is
    /// finalized once all rows are written.
    pub fn run(&mut self, registry: &mut CombinationRegistry) -> CombineResult<ScanReport> {
        let (width, height) = (self.width, self.height);

        let mut rows = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let row = RowBuffer::allocate(source.sample_kind(), width).map_err(|e| CombineError::Resource(
                format!("cannot allocate a row of {} samples for {}: {}", width, source.description(), e)))?;
            rows.push(row);
        }

        let mut ids: Vec<u32> = Vec::new();
        if let Some(sink) = self.sink.as_deref_mut() {
            ids.try_reserve_exact(width).map_err(|e| CombineError::Resource(
                format!("cannot allocate an output row of {} identifiers: {}", width, e)))?;
            ids.resize(width, 0);

            let first = &self.sources[0];
            if let Some(transform) = first.geo_transform() {
                sink.set_geo_transform(&transform)?;
            }
            if let Some(projection) = first.projection() {
                sink.set_projection(projection)?;
            }
        }

        debug!("Scanning {} inputs of {}x{}", self.sources.len(), width, height);
        let mut encoder = KeyEncoder::new(self.sources.len());

        for y in 0..height {
            for (source, row) in self.sources.iter_mut().zip(rows.iter_mut()) {
                source.read_row(y, row).map_err(|error| CombineError::RowRead {
                    name: source.description().to_string(),
                    row: y,
                    error,
                })?;
            }

            for x in 0..width {
                let key = encoder.encode(rows.iter().map(|row| Sample::at(row, x)));
                let id = registry.lookup_or_insert(key)?;
                if let Some(slot) = ids.get_mut(x) {
                    *slot = id;
                }
            }

            if let Some(sink) = self.sink.as_deref_mut() {
                sink.write_row(y, &ids).map_err(|error| CombineError::RowWrite {
                    name: sink.description().to_string(),
                    row: y,
                    error,
                })?;
            }

            if let Some(progress) = self.progress.as_deref_mut() {
                let fraction = if height > 1 { y as f64 / (height - 1) as f64 } else { 1.0 };
                progress.report(fraction);
            }
        }

        let mut range_overflow = None;
        if let Some(sink) = self.sink.as_deref_mut() {
            let data_type = sink.data_type();
            let limit = data_type.value_range();
            if registry.next_id() >= limit {
                warn!("{} combinations need identifiers up to {}, but {} output can only hold values below {}; \
                       larger identifiers were clamped",
                      registry.len(), registry.next_id() - 1, data_type, limit);
                range_overflow = Some(RangeOverflow { data_type, next_id: registry.next_id(), limit });
            }
            sink.finalize()?;
        }

        if let Some(progress) = self.progress.as_deref_mut() {
            progress.finish();
        }

        info!("Found {} distinct combinations in {} pixels", registry.len(), registry.total_count());

        Ok(ScanReport {
            width,
            height,
            pixels: width as u64 * height as u64,
            combinations: registry.len(),
            range_overflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::memory::{MemRasterSink, MemRasterSource};
    use crate::raster::types::{GeoTransform, Projection};
    use crate::tiff::errors::{TiffError, TiffResult};

    fn integers(name: &str, width: usize, height: usize, values: Vec<i64>) -> Box<dyn RasterSource> {
        Box::new(MemRasterSource::from_integers(name, width, height, values).unwrap())
    }

    #[derive(Default)]
    struct Recorder {
        fractions: Vec<f64>,
        finished: bool,
    }

    impl ProgressSink for Recorder {
        fn report(&mut self, fraction: f64) {
            self.fractions.push(fraction);
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn single_row_overlay_assigns_first_seen_identifiers() {
        let sources = vec![
            integers("A", 3, 1, vec![1, 1, 2]),
            integers("B", 3, 1, vec![5, 5, 5]),
        ];
        let mut sink = MemRasterSink::new("out", 3, 1, OutputDataType::UInt16);
        let mut progress = Recorder::default();
        let mut registry = CombinationRegistry::new(0);

        let report = ScanlineCombiner::new(sources).unwrap()
            .with_sink(&mut sink).unwrap()
            .with_progress(&mut progress)
            .run(&mut registry)
            .unwrap();

        assert_eq!(report.combinations, 2);
        assert!(report.range_overflow.is_none());
        assert_eq!(sink.row(0), &[0, 0, 1]);
        assert!(sink.is_finalized());

        let first = registry.get("1,5").unwrap();
        assert_eq!((first.identifier, first.count), (0, 2));
        let second = registry.get("2,5").unwrap();
        assert_eq!((second.identifier, second.count), (1, 1));

        assert_eq!(progress.fractions, vec![1.0]);
        assert!(progress.finished);
    }

    #[test]
    fn every_pixel_is_counted_and_mapped_to_its_identifier() {
        let (width, height) = (4, 3);
        let a: Vec<i64> = (0..12).map(|i| i % 3).collect();
        let b: Vec<f64> = (0..12).map(|i| (i % 2) as f64 + 0.2).collect();
        let sources: Vec<Box<dyn RasterSource>> = vec![
            integers("a", width, height, a.clone()),
            Box::new(MemRasterSource::from_reals("b", width, height, b.clone()).unwrap()),
        ];
        let mut sink = MemRasterSink::new("out", width, height, OutputDataType::UInt32);
        let mut progress = Recorder::default();
        let mut registry = CombinationRegistry::new(100);

        ScanlineCombiner::new(sources).unwrap()
            .with_sink(&mut sink).unwrap()
            .with_progress(&mut progress)
            .run(&mut registry)
            .unwrap();

        assert_eq!(registry.total_count(), 12);
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.iter().map(|r| r.count).sum::<u64>(), 12);

        for i in 0..12 {
            let key = format!("{},{}", a[i], b[i].round());
            assert_eq!(registry.get(&key).map(|r| r.identifier), Some(sink.values()[i]));
        }
        assert_eq!(progress.fractions, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn georeferencing_is_copied_from_the_first_input() {
        let transform = GeoTransform([500000.0, 30.0, 0.0, 4200000.0, 0.0, -30.0]);
        let projection = Projection {
            geo_key_directory: vec![1, 1, 0, 1, 3072, 0, 1, 32633],
            ..Projection::default()
        };
        let first = MemRasterSource::from_integers("a", 2, 1, vec![1, 2]).unwrap()
            .with_geo_transform(transform)
            .with_projection(projection.clone());
        let mut sink = MemRasterSink::new("out", 2, 1, OutputDataType::Byte);
        let mut registry = CombinationRegistry::default();

        let sources: Vec<Box<dyn RasterSource>> = vec![Box::new(first)];
        ScanlineCombiner::new(sources).unwrap()
            .with_sink(&mut sink).unwrap()
            .run(&mut registry)
            .unwrap();

        assert_eq!(sink.stored_geo_transform(), Some(transform));
        assert_eq!(sink.stored_projection(), Some(&projection));
    }

    #[test]
    fn byte_output_overflow_is_reported_but_not_fatal() {
        let values: Vec<i64> = (0..300).collect();
        let mut sink = MemRasterSink::new("out", 300, 1, OutputDataType::Byte);
        let mut registry = CombinationRegistry::new(0);

        let report = ScanlineCombiner::new(vec![integers("a", 300, 1, values)]).unwrap()
            .with_sink(&mut sink).unwrap()
            .run(&mut registry)
            .unwrap();

        assert_eq!(registry.len(), 300);
        let overflow = report.range_overflow.unwrap();
        assert_eq!(overflow.limit, 256);
        assert_eq!(overflow.next_id, 300);
        assert_eq!(sink.row(0)[299], 255);
        assert!(sink.is_finalized());
    }

    #[test]
    fn mismatched_inputs_are_rejected_before_scanning() {
        let sources = vec![
            integers("a", 3, 2, vec![0; 6]),
            integers("b", 2, 3, vec![0; 6]),
        ];
        let error = ScanlineCombiner::new(sources).err().unwrap();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("b is 2x3"));

        assert!(ScanlineCombiner::new(Vec::new()).is_err());
    }

    struct FailingSink;

    impl RasterSink for FailingSink {
        fn description(&self) -> &str { "failing" }
        fn width(&self) -> usize { 2 }
        fn height(&self) -> usize { 2 }
        fn data_type(&self) -> OutputDataType { OutputDataType::UInt16 }
        fn set_geo_transform(&mut self, _: &GeoTransform) -> TiffResult<()> { Ok(()) }
        fn set_projection(&mut self, _: &Projection) -> TiffResult<()> { Ok(()) }
        fn write_row(&mut self, _row: usize, _ids: &[u32]) -> TiffResult<()> {
            Err(TiffError::GenericError("disk full".to_string()))
        }
        fn finalize(&mut self) -> TiffResult<()> { Ok(()) }
    }

    #[test]
    fn row_write_failure_aborts_the_scan() {
        let mut sink = FailingSink;
        let mut registry = CombinationRegistry::default();

        let error = ScanlineCombiner::new(vec![integers("a", 2, 2, vec![1, 2, 3, 4])]).unwrap()
            .with_sink(&mut sink).unwrap()
            .run(&mut registry)
            .unwrap_err();

        assert!(matches!(error, CombineError::RowWrite { row: 0, .. }));
        assert_eq!(registry.total_count(), 2);
    }

    #[test]
    fn scanning_without_an_output_only_fills_the_registry() {
        let mut registry = CombinationRegistry::default();
        let report = ScanlineCombiner::new(vec![integers("a", 2, 2, vec![7, 7, 7, 8])]).unwrap()
            .run(&mut registry)
            .unwrap();

        assert_eq!(report.pixels, 4);
        assert_eq!(report.combinations, 2);
        assert!(report.range_overflow.is_none());
    }
}
