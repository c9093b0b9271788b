//! Defaults file
//!
//! Optional TOML file whose `[combine]` table supplies defaults for
//! command line options:
//!
//! ```toml
//! [combine]
//! output_format = "GTiff"
//! output_type = "UInt32"
//! initial_id = 1
//! quiet = false
//! log_file = "rastercombine.log"
//! creation_options = ["COMPRESS=DEFLATE", "BIGTIFF=IF_NEEDED"]
//! ```

use std::fs;

use crate::errors::{CombineError, CombineResult};

/// Values read from the `[combine]` table; absent keys stay `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDefaults {
    pub output_format: Option<String>,
    pub output_type: Option<String>,
    pub initial_id: Option<i64>,
    pub quiet: Option<bool>,
    pub log_file: Option<String>,
    pub creation_options: Vec<String>,
}

impl ConfigDefaults {
    /// Parses defaults from TOML text
    pub fn from_str(content: &str) -> CombineResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| CombineError::Configuration(format!("Failed to parse TOML: {}", e)))?;

        let mut defaults = ConfigDefaults::default();
        let Some(table) = toml_value.get("combine") else {
            return Ok(defaults);
        };
        let table = table.as_table()
            .ok_or_else(|| CombineError::Configuration("[combine] must be a table".to_string()))?;

        for (key, value) in table {
            match key.as_str() {
                "output_format" => defaults.output_format = Some(Self::string(key, value)?),
                "output_type" => defaults.output_type = Some(Self::string(key, value)?),
                "log_file" => defaults.log_file = Some(Self::string(key, value)?),
                "initial_id" => defaults.initial_id = Some(value.as_integer()
                    .ok_or_else(|| Self::wrong_type(key, "an integer"))?),
                "quiet" => defaults.quiet = Some(value.as_bool()
                    .ok_or_else(|| Self::wrong_type(key, "a boolean"))?),
                "creation_options" => {
                    let items = value.as_array()
                        .ok_or_else(|| Self::wrong_type(key, "an array of strings"))?;
                    defaults.creation_options = items.iter()
                        .map(|item| Self::string(key, item))
                        .collect::<CombineResult<_>>()?;
                }
                other => log::warn!("Ignoring unknown key {} in [combine]", other),
            }
        }

        Ok(defaults)
    }

    /// Loads defaults from a TOML file
    pub fn from_file(path: &str) -> CombineResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CombineError::Configuration(format!("Cannot read config file {}: {}", path, e)))?;
        Self::from_str(&contents)
    }

    fn string(key: &str, value: &toml::Value) -> CombineResult<String> {
        value.as_str()
            .map(str::to_string)
            .ok_or_else(|| Self::wrong_type(key, "a string"))
    }

    fn wrong_type(key: &str, expected: &str) -> CombineError {
        CombineError::Configuration(format!("{} in [combine] must be {}", key, expected))
    }
}
