//! Logger utility for application-wide logging
//!
//! A `log` backend that echoes records to the console and, when a log file
//! is configured, appends every record to it as well.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Console and optional file logger
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
    /// Most verbose level echoed to the console
    console_level: LevelFilter,
}

impl Logger {
    /// Creates a logger, appending to `log_file` when given
    pub fn new(log_file: Option<&str>, console_level: LevelFilter) -> io::Result<Self> {
        let file = match log_file {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(Path::new(path))?),
            None => None,
        };
        Ok(Logger {
            file: Mutex::new(file),
            console_level,
        })
    }

    /// Logs a message to the log file, if there is one
    pub fn log(&self, message: &str) -> io::Result<()> {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                writeln!(file, "{}", message)?;
                file.flush()?;
            }
        }
        Ok(())
    }

    pub fn has_file(&self) -> bool {
        self.file.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Installs a logger as the `log` crate's backend
    pub fn init_global_logger(log_file: Option<&str>, console_level: LevelFilter) -> io::Result<()> {
        let global_logger = Logger::new(log_file, console_level)?;
        let max_level = if global_logger.has_file() { LevelFilter::Debug } else { console_level };

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = format!("[{}] {}", record.level(), record.args());
        let _ = self.log(&message);

        if record.level() <= self.console_level {
            if record.level() <= Level::Warn {
                eprintln!("{}", message);
            } else {
                println!("{}", message);
            }
        }
    }

    fn flush(&self) {
        // Already flushing in the log method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn messages_are_appended_to_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let path = path.to_str().unwrap();

        let logger = Logger::new(Some(path), LevelFilter::Off).unwrap();
        logger.log("first").unwrap();
        logger.log("second").unwrap();
        assert!(logger.has_file());

        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn without_a_file_logging_is_a_no_op() {
        let logger = Logger::new(None, LevelFilter::Warn).unwrap();
        assert!(!logger.has_file());
        assert!(logger.log("dropped").is_ok());
    }
}
