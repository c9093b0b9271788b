//! Combination engine
//!
//! Overlays co-registered rasters pixel by pixel, catalogues the distinct
//! value combinations and exports them as a table.

pub mod sample;
pub mod key;
pub mod registry;
pub mod combiner;
pub mod csv_export;

pub use combiner::{RangeOverflow, ScanReport, ScanlineCombiner};
pub use csv_export::CsvExporter;
pub use key::{CombinationKey, KeyEncoder};
pub use registry::{CombinationRecord, CombinationRegistry};
pub use sample::Sample;
