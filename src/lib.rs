pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod raster;
pub mod combine;
pub mod commands;
pub mod errors;
pub mod api;

pub use crate::api::{run_combine, CombineSettings, CombineSummary, RasterCombine};
pub use crate::errors::{CombineError, CombineResult};

pub use combine::{CombinationRegistry, CsvExporter, KeyEncoder, Sample, ScanlineCombiner};
pub use raster::{OutputDataType, RasterSink, RasterSource};
pub use tiff::TiffReader;
