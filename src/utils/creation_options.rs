//! Raster creation options
//!
//! `NAME=VALUE` settings given with `-co`, validated once up front and then
//! interpreted by whichever driver creates the output.

use lazy_static::lazy_static;
use regex::Regex;

use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    static ref OPTION_PATTERN: Regex = Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*=(.*)$").unwrap();
}

/// An ordered list of creation options with upper-cased names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreationOptions {
    entries: Vec<(String, String)>,
}

impl CreationOptions {
    /// Parses raw `NAME=VALUE` strings
    ///
    /// Names are case-insensitive; when a name repeats, the last value wins.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> TiffResult<Self> {
        let mut options = CreationOptions::default();

        for item in raw {
            let item = item.as_ref();
            let captures = OPTION_PATTERN.captures(item).ok_or_else(|| {
                TiffError::InvalidCreationOption(format!("'{}' is not of the form NAME=VALUE", item))
            })?;

            let name = captures[1].to_ascii_uppercase();
            let value = captures[2].trim().to_string();
            options.set(&name, value);
        }

        Ok(options)
    }

    /// Sets `name` (case-insensitively) to `value`
    pub fn set(&mut self, name: &str, value: String) {
        let name = name.to_ascii_uppercase();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Option names, upper-cased, in the order given
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the value of `name` as an integer in `[min, max]`
    pub fn get_int(&self, name: &str, min: i64, max: i64) -> TiffResult<Option<i64>> {
        let Some(raw) = self.get(name) else {
            return Ok(None);
        };

        let value: i64 = raw.parse().map_err(|_| {
            TiffError::InvalidCreationOption(format!("{}={} is not an integer", name, raw))
        })?;
        crate::tiff::validation::validate_range(value, min, max, name)?;

        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive_and_last_wins() {
        let options = CreationOptions::parse(&["compress=deflate", "BLOCKYSIZE=16", "Compress=ZSTD"]).unwrap();
        assert_eq!(options.get("COMPRESS"), Some("ZSTD"));
        assert_eq!(options.get("blockysize"), Some("16"));
        assert_eq!(options.names().collect::<Vec<_>>(), vec!["BLOCKYSIZE", "COMPRESS"]);
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(matches!(CreationOptions::parse(&["COMPRESS"]),
                         Err(TiffError::InvalidCreationOption(_))));
        assert!(CreationOptions::parse(&["=DEFLATE"]).is_err());
        assert!(CreationOptions::parse(&["9LIVES=1"]).is_err());
    }

    #[test]
    fn integer_values_are_range_checked() {
        let options = CreationOptions::parse(&["ZSTD_LEVEL=30", "BLOCKYSIZE=abc", "PREDICTOR=2"]).unwrap();
        assert!(options.get_int("ZSTD_LEVEL", 1, 22).is_err());
        assert!(options.get_int("BLOCKYSIZE", 1, 1 << 20).is_err());
        assert_eq!(options.get_int("PREDICTOR", 1, 3).unwrap(), Some(2));
        assert_eq!(options.get_int("ZLEVEL", 1, 9).unwrap(), None);
    }
}
