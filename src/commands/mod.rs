//! CLI command implementations
//!
//! The command line definition and the commands it dispatches to, using
//! the Command pattern.

pub mod command_traits;
pub mod cli;
pub mod combine_command;

pub use cli::{build_cli, normalize_gdal_style_args};
pub use combine_command::CombineCommand;
pub use command_traits::{Command, CommandFactory};

use clap::ArgMatches;
use crate::errors::CombineResult;
use crate::utils::config::ConfigDefaults;
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
#[derive(Default)]
pub struct RasterCombineCommandFactory {
    /// Settings from the defaults file, already loaded by the caller
    defaults: ConfigDefaults,
}

impl RasterCombineCommandFactory {
    /// Create a new factory instance
    pub fn new(defaults: ConfigDefaults) -> Self {
        RasterCombineCommandFactory { defaults }
    }
}

impl<'a> CommandFactory<'a> for RasterCombineCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> CombineResult<Box<dyn Command + 'a>> {
        Ok(Box::new(CombineCommand::new(args, &self.defaults, logger)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_uses_the_defaults_it_was_given() {
        // The named file does not exist; only the supplied defaults are used
        let args = build_cli()
            .try_get_matches_from(normalize_gdal_style_args(
                ["rastercombine", "-config", "/nonexistent/defaults.toml", "-csv", "t.csv", "a.tif"]))
            .unwrap();
        let logger = Logger::new(None, log::LevelFilter::Off).unwrap();

        let defaults = ConfigDefaults { output_type: Some("Byte".to_string()), ..ConfigDefaults::default() };
        assert!(RasterCombineCommandFactory::new(defaults).create_command(&args, &logger).is_ok());

        let defaults = ConfigDefaults { output_type: Some("Int8".to_string()), ..ConfigDefaults::default() };
        let error = RasterCombineCommandFactory::new(defaults).create_command(&args, &logger).err().unwrap();
        assert!(error.is_configuration());
    }
}
