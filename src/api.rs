//! Library facade
//!
//! Wires drivers, combiner and CSV exporter together from a settings
//! struct, the same way the command line tool does.

use log::{debug, info};
use std::time::{Duration, Instant};

use crate::combine::{CombinationRegistry, CsvExporter, ScanReport, ScanlineCombiner};
use crate::errors::{CombineError, CombineResult};
use crate::raster::driver::{available_drivers, Driver, RasterDriverFactory};
use crate::raster::sink::RasterSink;
use crate::raster::source::RasterSource;
use crate::raster::types::OutputDataType;
use crate::tiff::errors::TiffError;
use crate::utils::creation_options::CreationOptions;
use crate::utils::logger::Logger;
use crate::utils::progress::{NoProgress, ProgressSink, ProgressTracker};

/// Everything needed for one combine run
#[derive(Debug, Clone)]
pub struct CombineSettings {
    /// Input raster paths, in key field order
    pub inputs: Vec<String>,
    /// CSV table to write
    pub csv_path: String,
    /// Optional identifier raster to write
    pub output: Option<String>,
    /// Driver short name for the output raster
    pub output_format: String,
    pub output_type: OutputDataType,
    pub initial_id: u32,
    pub creation_options: CreationOptions,
    /// No progress bar
    pub quiet: bool,
}

impl CombineSettings {
    pub fn new(inputs: Vec<String>, csv_path: &str) -> Self {
        CombineSettings {
            inputs,
            csv_path: csv_path.to_string(),
            output: None,
            output_format: "GTiff".to_string(),
            output_type: OutputDataType::UInt16,
            initial_id: 0,
            creation_options: CreationOptions::default(),
            quiet: true,
        }
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct CombineSummary {
    pub report: ScanReport,
    /// Rows written to the CSV table, excluding the header
    pub records_written: usize,
    pub elapsed: Duration,
}

/// Main interface to the rastercombine library
pub struct RasterCombine {
    logger: Logger,
}

impl RasterCombine {
    /// Create a new instance, appending run summaries to `log_file` if given
    pub fn new(log_file: Option<&str>) -> CombineResult<Self> {
        let logger = Logger::new(log_file, log::LevelFilter::Off)?;
        Ok(RasterCombine { logger })
    }

    /// Runs one combination
    pub fn combine(&self, settings: &CombineSettings) -> CombineResult<CombineSummary> {
        run_combine(settings, &self.logger)
    }
}

/// Runs one combination, recording a summary with `logger`
///
/// The CSV target is opened before any input so an unwritable path fails
/// fast; nothing is written to it if the scan aborts.
pub fn run_combine(settings: &CombineSettings, logger: &Logger) -> CombineResult<CombineSummary> {
    let start = Instant::now();

    if settings.inputs.is_empty() {
        return Err(CombineError::Configuration("no input rasters given".to_string()));
    }
    if settings.csv_path.is_empty() {
        return Err(CombineError::Configuration("an output CSV file is required".to_string()));
    }

    let driver = match &settings.output {
        Some(_) => Some(resolve_driver(&settings.output_format)?),
        None => None,
    };

    let exporter = CsvExporter::create(&settings.csv_path, &settings.inputs)?;

    let mut sources: Vec<Box<dyn RasterSource>> = Vec::with_capacity(settings.inputs.len());
    for path in &settings.inputs {
        let source = RasterDriverFactory::open_source(path)
            .map_err(|error| CombineError::SourceOpen { path: path.clone(), error })?;
        sources.push(source);
    }

    let first = &sources[0];
    info!("Combining {} rasters of {}x{}", sources.len(), first.width(), first.height());
    if let Some(transform) = first.geo_transform() {
        let (x, y) = transform.origin();
        let (dx, dy) = transform.pixel_size();
        debug!("Origin ({}, {}), pixel size ({}, {})", x, y, dx, dy);
    }
    if let Some(epsg) = first.projection().and_then(|p| p.epsg_code()) {
        debug!("Inputs are in EPSG:{}", epsg);
    }

    // Declared ahead of the combiner, which borrows them
    let mut sink: Option<Box<dyn RasterSink>> = None;
    let mut progress: Box<dyn ProgressSink> = if settings.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressTracker::new("Combining"))
    };

    let mut combiner = ScanlineCombiner::new(sources)?;
    let (width, height) = combiner.dimensions();

    if let (Some(path), Some(driver)) = (&settings.output, driver) {
        sink = Some(RasterDriverFactory::create_sink(driver, path, width, height,
                                                     settings.output_type, &settings.creation_options)
            .map_err(|error| creation_error(path, error))?);
    }

    combiner = combiner.with_progress(&mut *progress);
    if let Some(sink) = sink.as_deref_mut() {
        combiner = combiner.with_sink(sink)?;
    }

    let mut registry = CombinationRegistry::new(settings.initial_id);
    let report = combiner.run(&mut registry)?;
    drop(combiner);

    let records_written = exporter.export(&registry)?;

    let elapsed = start.elapsed();
    if let Some(path) = &settings.output {
        info!("Identifier raster written to: {}", path);
    }
    info!("Tabular output written to: {}", settings.csv_path);
    info!("Elapsed time: {:.2} seconds", elapsed.as_secs_f64());

    logger.log(&format!("Combined {} into {} ({} combinations, {} pixels, {:.2}s)",
                        settings.inputs.join(", "), settings.csv_path,
                        report.combinations, report.pixels, elapsed.as_secs_f64()))?;

    Ok(CombineSummary { report, records_written, elapsed })
}

/// Looks up an output driver, listing the available ones when unknown
pub fn resolve_driver(name: &str) -> CombineResult<Driver> {
    Driver::from_name(name).ok_or_else(|| {
        let listing: Vec<String> = available_drivers().iter()
            .map(|info| format!("{}: {}", info.short_name, info.long_name))
            .collect();
        CombineError::Configuration(format!(
            "output driver '{}' not recognised; available drivers: {}", name, listing.join(", ")))
    })
}

fn creation_error(path: &str, error: TiffError) -> CombineError {
    match error {
        TiffError::InvalidCreationOption(msg) => CombineError::Configuration(msg),
        other => CombineError::Resource(format!("cannot create {}: {}", path, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_drivers_list_the_alternatives() {
        let error = resolve_driver("HFA").unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("GTiff: GeoTIFF"));
        assert_eq!(resolve_driver("mem").unwrap(), Driver::Mem);
    }

    #[test]
    fn missing_inputs_are_configuration_errors() {
        let logger = Logger::new(None, log::LevelFilter::Off).unwrap();
        let settings = CombineSettings::new(Vec::new(), "out.csv");
        assert!(run_combine(&settings, &logger).unwrap_err().is_configuration());
    }
}
