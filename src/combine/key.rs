//! Combination keys
//!
//! A key is the comma-joined text of one formatted sample per source, in
//! source order. Two pixels belong to the same combination exactly when
//! their keys are textually equal.

use std::borrow::Borrow;
use std::fmt::{self, Write};

use crate::combine::sample::Sample;

/// Field separator within a key
pub const SEPARATOR: char = ',';

/// Typical width of one formatted field, used to size the key buffer
const FIELD_CAPACITY: usize = 12;

/// Owned combination key, as stored in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey(String);

impl CombinationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The per-source fields of the key
    ///
    /// A single trailing separator is ignored.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        let text = self.0.strip_suffix(SEPARATOR).unwrap_or(&self.0);
        text.split(SEPARATOR)
    }
}

impl From<&str> for CombinationKey {
    fn from(text: &str) -> Self {
        CombinationKey(text.to_string())
    }
}

impl Borrow<str> for CombinationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds keys into a single reusable buffer
#[derive(Debug)]
pub struct KeyEncoder {
    buffer: String,
}

impl KeyEncoder {
    /// An encoder sized for `sources` fields
    pub fn new(sources: usize) -> Self {
        KeyEncoder {
            buffer: String::with_capacity(sources.max(1) * FIELD_CAPACITY),
        }
    }

    /// Encodes one pixel's samples, in source order
    ///
    /// The returned key is only valid until the next call.
    pub fn encode<I>(&mut self, samples: I) -> &str
    where
        I: IntoIterator<Item = Sample>,
    {
        self.buffer.clear();
        for (i, sample) in samples.into_iter().enumerate() {
            if i > 0 {
                self.buffer.push(SEPARATOR);
            }
            // Formatting into a String is infallible
            let _ = write!(self.buffer, "{}", sample);
        }
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_joined_in_source_order() {
        let mut encoder = KeyEncoder::new(3);
        let key = encoder.encode([Sample::Integer(1), Sample::Real(4.6), Sample::Integer(-2)]);
        assert_eq!(key, "1,5,-2");

        let key = encoder.encode([Sample::Integer(7)]);
        assert_eq!(key, "7");
    }

    #[test]
    fn integer_and_rounded_real_fields_compare_equal() {
        let mut encoder = KeyEncoder::new(2);
        let first = encoder.encode([Sample::Integer(3), Sample::Real(10.2)]).to_string();
        let second = encoder.encode([Sample::Real(3.1), Sample::Integer(10)]).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn trailing_separator_is_dropped_from_fields() {
        let key = CombinationKey::from("1,5,");
        assert_eq!(key.fields().collect::<Vec<_>>(), vec!["1", "5"]);

        let key = CombinationKey::from("1,,5");
        assert_eq!(key.fields().count(), 3);
    }
}
