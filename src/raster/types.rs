//! Value types shared by raster sources and sinks

use std::collections::TryReserveError;
use std::fmt;

/// How a source's native samples are classified for keying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Any signed or unsigned integer storage type
    Integer,
    /// Floating point storage
    Real,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Integer => write!(f, "integer"),
            SampleKind::Real => write!(f, "real"),
        }
    }
}

/// Unsigned sample type of the output identifier raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDataType {
    Byte,
    UInt16,
    UInt32,
}

impl OutputDataType {
    /// Parses a `-ot` value, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "byte" => Some(OutputDataType::Byte),
            "uint16" => Some(OutputDataType::UInt16),
            "uint32" => Some(OutputDataType::UInt32),
            _ => None,
        }
    }

    /// The canonical name, as accepted by `from_name`
    pub fn name(&self) -> &'static str {
        match self {
            OutputDataType::Byte => "Byte",
            OutputDataType::UInt16 => "UInt16",
            OutputDataType::UInt32 => "UInt32",
        }
    }

    pub fn bits_per_sample(&self) -> u32 {
        match self {
            OutputDataType::Byte => 8,
            OutputDataType::UInt16 => 16,
            OutputDataType::UInt32 => 32,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample() as usize / 8
    }

    /// Number of distinct values the type can hold (`2^bits`)
    pub fn value_range(&self) -> u64 {
        1u64 << self.bits_per_sample()
    }

    /// Largest storable identifier
    pub fn max_value(&self) -> u32 {
        (self.value_range() - 1) as u32
    }

    /// Clamps an identifier into the storable range
    pub fn clamp(&self, id: u32) -> u32 {
        id.min(self.max_value())
    }
}

impl fmt::Display for OutputDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Affine pixel-to-world transform in GDAL coefficient order
///
/// `x = c[0] + col * c[1] + row * c[2]`, `y = c[3] + col * c[4] + row * c[5]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// Whether the transform is a plain north-up scale and offset
    pub fn is_north_up(&self) -> bool {
        self.0[2] == 0.0 && self.0[4] == 0.0
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.0[0], self.0[3])
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (self.0[1], self.0[5])
    }
}

/// GeoKey ids consulted when describing a projection
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

/// Values at or above this are "user-defined" rather than EPSG codes
const USER_DEFINED: u16 = 32767;

/// Coordinate reference system carried as raw GeoTIFF key data
///
/// The key directory and its parameter tags are copied verbatim from the
/// first source to the output; nothing here interprets projections beyond
/// picking out an EPSG code for log messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// GeoKeyDirectoryTag contents (header plus 4 shorts per key)
    pub geo_key_directory: Vec<u16>,
    /// GeoDoubleParamsTag contents
    pub double_params: Vec<f64>,
    /// GeoAsciiParamsTag contents without the terminating NUL
    pub ascii_params: String,
}

impl Projection {
    /// Iterates the `(key id, tag location, count, value)` entries
    pub fn geo_keys(&self) -> impl Iterator<Item = GeoKeyEntry> + '_ {
        let declared = self.geo_key_directory.get(3).copied().unwrap_or(0) as usize;
        self.geo_key_directory
            .get(4..)
            .unwrap_or(&[])
            .chunks_exact(4)
            .take(declared)
            .map(|chunk| GeoKeyEntry {
                key_id: chunk[0],
                tiff_tag_location: chunk[1],
                count: chunk[2],
                value_offset: chunk[3],
            })
    }

    /// EPSG code of the projected or, failing that, geographic system
    pub fn epsg_code(&self) -> Option<u16> {
        let lookup = |wanted: u16| self.geo_keys()
            .find(|key| key.key_id == wanted && key.tiff_tag_location == 0)
            .map(|key| key.value_offset)
            .filter(|&code| code != 0 && code < USER_DEFINED);

        lookup(PROJECTED_CS_TYPE_GEO_KEY).or_else(|| lookup(GEOGRAPHIC_TYPE_GEO_KEY))
    }
}

/// One entry of a GeoKey directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

/// One scanline of samples from a single source
#[derive(Debug, Clone, PartialEq)]
pub enum RowBuffer {
    Integer(Vec<i64>),
    Real(Vec<f64>),
}

impl RowBuffer {
    /// Allocates a zeroed buffer of `width` samples of the given kind
    pub fn allocate(kind: SampleKind, width: usize) -> Result<Self, TryReserveError> {
        Ok(match kind {
            SampleKind::Integer => {
                let mut values = Vec::new();
                values.try_reserve_exact(width)?;
                values.resize(width, 0);
                RowBuffer::Integer(values)
            }
            SampleKind::Real => {
                let mut values = Vec::new();
                values.try_reserve_exact(width)?;
                values.resize(width, 0.0);
                RowBuffer::Real(values)
            }
        })
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            RowBuffer::Integer(_) => SampleKind::Integer,
            RowBuffer::Real(_) => SampleKind::Real,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowBuffer::Integer(values) => values.len(),
            RowBuffer::Real(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_types_know_their_range() {
        assert_eq!(OutputDataType::Byte.value_range(), 256);
        assert_eq!(OutputDataType::UInt16.max_value(), 65535);
        assert_eq!(OutputDataType::UInt32.max_value(), u32::MAX);
        assert_eq!(OutputDataType::Byte.clamp(300), 255);
        assert_eq!(OutputDataType::from_name("uint16"), Some(OutputDataType::UInt16));
        assert_eq!(OutputDataType::from_name("Int16"), None);
    }

    #[test]
    fn epsg_code_prefers_projected_system() {
        let projection = Projection {
            geo_key_directory: vec![
                1, 1, 0, 3,
                1024, 0, 1, 1,
                2048, 0, 1, 4326,
                3072, 0, 1, 32633,
            ],
            ..Projection::default()
        };
        assert_eq!(projection.epsg_code(), Some(32633));

        let geographic = Projection {
            geo_key_directory: vec![1, 1, 0, 1, 2048, 0, 1, 4326],
            ..Projection::default()
        };
        assert_eq!(geographic.epsg_code(), Some(4326));
        assert_eq!(Projection::default().epsg_code(), None);
    }
}
