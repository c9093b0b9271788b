//! Per-pixel sample values

use std::fmt;

use crate::raster::types::RowBuffer;

/// One value read from one source at one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Integer(i64),
    Real(f64),
}

impl Sample {
    /// The value at column `x` of a decoded row
    pub fn at(row: &RowBuffer, x: usize) -> Sample {
        match row {
            RowBuffer::Integer(values) => Sample::Integer(values[x]),
            RowBuffer::Real(values) => Sample::Real(values[x]),
        }
    }
}

/// Canonical key field: decimal for integers, reals rounded to whole numbers
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Integer(value) => write!(f, "{}", value),
            Sample::Real(value) => write!(f, "{:.0}", value),
        }
    }
}

impl From<i64> for Sample {
    fn from(value: i64) -> Self {
        Sample::Integer(value)
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample::Real(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reals_are_bucketed_to_whole_numbers() {
        assert_eq!(Sample::Real(2.4).to_string(), "2");
        assert_eq!(Sample::Real(2.6).to_string(), "3");
        assert_eq!(Sample::Real(-7.8).to_string(), "-8");
        assert_eq!(Sample::Real(1e6).to_string(), "1000000");
    }

    #[test]
    fn integers_are_plain_decimal() {
        assert_eq!(Sample::Integer(-42).to_string(), "-42");
        assert_eq!(Sample::from(i64::MAX).to_string(), "9223372036854775807");
    }

    #[test]
    fn samples_are_taken_from_typed_rows() {
        let row = RowBuffer::Real(vec![0.25, 9.5]);
        assert_eq!(Sample::at(&row, 1), Sample::Real(9.5));
        let row = RowBuffer::Integer(vec![3, 4]);
        assert_eq!(Sample::at(&row, 0), Sample::Integer(3));
    }
}
