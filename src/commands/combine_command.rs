//! Combine command
//!
//! Turns parsed command line options (and the optional defaults file) into
//! combine settings and runs them.

use clap::ArgMatches;
use log::info;
use std::fs;

use crate::api::{self, CombineSettings};
use crate::commands::command_traits::Command;
use crate::errors::{CombineError, CombineResult};
use crate::raster::types::OutputDataType;
use crate::utils::config::ConfigDefaults;
use crate::utils::creation_options::CreationOptions;
use crate::utils::logger::Logger;

/// Command for combining rasters
pub struct CombineCommand<'a> {
    settings: CombineSettings,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> CombineCommand<'a> {
    /// Create a new combine command
    ///
    /// Explicit options win over `defaults`.
    pub fn new(args: &ArgMatches, defaults: &ConfigDefaults, logger: &'a Logger) -> CombineResult<Self> {
        Ok(CombineCommand {
            settings: Self::settings_from(args, defaults)?,
            logger,
        })
    }

    /// Merges command line options over `defaults`
    pub fn settings_from(args: &ArgMatches, defaults: &ConfigDefaults) -> CombineResult<CombineSettings> {
        let mut inputs: Vec<String> = args.get_many::<String>("inputs")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        if let Some(list) = args.get_one::<String>("input_file_list") {
            inputs.extend(read_input_file_list(list)?);
        }

        let csv_path = args.get_one::<String>("csv")
            .cloned()
            .ok_or_else(|| CombineError::Configuration("an output CSV file is required (-csv)".to_string()))?;
        if inputs.is_empty() {
            return Err(CombineError::Configuration("at least one input raster is required".to_string()));
        }

        let output_format = args.get_one::<String>("format")
            .or(defaults.output_format.as_ref())
            .cloned()
            .unwrap_or_else(|| "GTiff".to_string());

        let output_type = match args.get_one::<String>("type").or(defaults.output_type.as_ref()) {
            Some(name) => OutputDataType::from_name(name).ok_or_else(|| CombineError::Configuration(
                format!("output data type {} is not valid (expected Byte, UInt16 or UInt32)", name)))?,
            None => OutputDataType::UInt16,
        };

        let initial_id = args.get_one::<i64>("initid").copied()
            .or(defaults.initial_id)
            .unwrap_or(0);
        let initial_id = u32::try_from(initial_id).map_err(|_| CombineError::Configuration(
            format!("initial identifier {} is outside 0..={}", initial_id, u32::MAX)))?;

        let mut raw_options = defaults.creation_options.clone();
        if let Some(values) = args.get_many::<String>("co") {
            raw_options.extend(values.cloned());
        }
        let creation_options = CreationOptions::parse(&raw_options)?;

        let quiet = args.get_flag("quiet") || defaults.quiet.unwrap_or(false);

        let mut settings = CombineSettings::new(inputs, &csv_path);
        settings.output = args.get_one::<String>("output").cloned();
        settings.output_format = output_format;
        settings.output_type = output_type;
        settings.initial_id = initial_id;
        settings.creation_options = creation_options;
        settings.quiet = quiet;
        Ok(settings)
    }
}

/// Reads one raster path per line, skipping blank lines
fn read_input_file_list(path: &str) -> CombineResult<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| CombineError::Resource(
        format!("cannot read input file list {}: {}", path, e)))?;
    Ok(contents.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

impl<'a> Command for CombineCommand<'a> {
    fn execute(&self) -> CombineResult<()> {
        let summary = api::run_combine(&self.settings, self.logger)?;

        if let Some(overflow) = summary.report.range_overflow {
            self.logger.log(&format!("{} output cannot hold identifier {}; values were clamped",
                                     overflow.data_type, overflow.next_id - 1))?;
        }
        info!("{} combinations written in {:.2} seconds",
              summary.records_written, summary.elapsed.as_secs_f64());
        Ok(())
    }
}
