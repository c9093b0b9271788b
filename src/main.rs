use clap::error::ErrorKind;
use log::{error, LevelFilter};
use std::process;

use rastercombine::commands::{build_cli, normalize_gdal_style_args, CommandFactory, RasterCombineCommandFactory};
use rastercombine::utils::config::ConfigDefaults;
use rastercombine::utils::logger::Logger;

fn main() {
    let args = normalize_gdal_style_args(std::env::args());
    let matches = match build_cli().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    // The defaults file may name the log file and ask for quiet output
    let defaults = match matches.get_one::<String>("config") {
        Some(path) => match ConfigDefaults::from_file(path) {
            Ok(defaults) => defaults,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => ConfigDefaults::default(),
    };

    let quiet = matches.get_flag("quiet") || defaults.quiet.unwrap_or(false);
    let console_level = if quiet { LevelFilter::Warn } else { LevelFilter::Info };
    let log_file = matches.get_one::<String>("log_file").or(defaults.log_file.as_ref());

    let logger = match Logger::new(log_file.map(String::as_str), LevelFilter::Off) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger(log_file.map(String::as_str), console_level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = RasterCombineCommandFactory::new(defaults);

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
