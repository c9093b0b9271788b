//! TIFF tag utilities
//!
//! Utilities for fetching tag payloads (inline or at an offset) and decoding
//! them into integers, doubles or text.

use std::io::SeekFrom;

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, field_types, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFDEntry;

/// Determine how much space a particular TIFF field type needs in bytes
pub fn get_field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,  // Default to 1 byte
    }
}

/// Reads the raw payload bytes of a tag
///
/// Inline payloads come straight out of the entry's value field; anything
/// larger is read from the referenced offset.
///
/// # Arguments
/// * `reader` - The seekable reader to use
/// * `entry` - The IFD entry with tag information
/// * `is_big_tiff` - Whether the file is BigTIFF format
pub fn read_tag_bytes(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    is_big_tiff: bool,
) -> TiffResult<Vec<u8>> {
    let size = entry.get_field_type_size()
        .checked_mul(entry.count as usize)
        .ok_or_else(|| TiffError::GenericError(format!(
            "Tag {} payload size overflows", entry.tag)))?;

    if entry.is_value_inline(is_big_tiff) {
        return Ok(entry.raw_value[..size].to_vec());
    }

    reader.seek(SeekFrom::Start(entry.value_offset))?;
    let mut buffer = vec![0u8; size];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Decodes a tag payload of any unsigned integer type into u64 values
///
/// # Arguments
/// * `bytes` - Payload bytes as returned by `read_tag_bytes`
/// * `entry` - The IFD entry the payload belongs to
/// * `handler` - The byte order handler
pub fn decode_integer_values(
    bytes: &[u8],
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
) -> TiffResult<Vec<u64>> {
    let size = entry.get_field_type_size();
    let values = bytes.chunks_exact(size)
        .map(|chunk| match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => Ok(chunk[0] as u64),
            field_types::SHORT | field_types::SSHORT => Ok(handler.u16_from(chunk) as u64),
            field_types::LONG | field_types::SLONG => Ok(handler.u32_from(chunk) as u64),
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => Ok(handler.u64_from(chunk)),
            other => Err(TiffError::UnsupportedFieldType(other)),
        })
        .collect::<TiffResult<Vec<u64>>>()?;

    Ok(values)
}

/// Decodes a FLOAT or DOUBLE tag payload into f64 values
pub fn decode_real_values(
    bytes: &[u8],
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
) -> TiffResult<Vec<f64>> {
    match entry.field_type {
        field_types::DOUBLE => Ok(bytes.chunks_exact(8)
            .map(|chunk| f64::from_bits(handler.u64_from(chunk)))
            .collect()),
        field_types::FLOAT => Ok(bytes.chunks_exact(4)
            .map(|chunk| f32::from_bits(handler.u32_from(chunk)) as f64)
            .collect()),
        other => Err(TiffError::UnsupportedFieldType(other)),
    }
}

/// Get the name of a TIFF tag
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SOFTWARE => "Software",
        tags::PREDICTOR => "Predictor",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::SAMPLE_FORMAT => "SampleFormat",

        // GeoTIFF tags
        tags::MODEL_PIXEL_SCALE_TAG => "ModelPixelScale",
        tags::MODEL_TIEPOINT_TAG => "ModelTiepoint",
        tags::MODEL_TRANSFORMATION_TAG => "ModelTransformation",
        tags::GEO_KEY_DIRECTORY_TAG => "GeoKeyDirectory",
        tags::GEO_DOUBLE_PARAMS_TAG => "GeoDoubleParams",
        tags::GEO_ASCII_PARAMS_TAG => "GeoAsciiParams",

        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::LZW => "LZW",
        compression::DEFLATE => "Adobe Deflate",
        compression::ZSTD => "Zstandard",
        compression::PACKBITS => "PackBits",
        compression::DEFLATE_LEGACY => "Deflate (legacy code)",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::{BigEndianHandler, LittleEndianHandler};
    use std::io::Cursor;

    #[test]
    fn inline_short_pair_decodes_in_both_byte_orders() {
        let le = IFDEntry::from_raw(
            tags::BITS_PER_SAMPLE, field_types::SHORT, 2,
            [16, 0, 8, 0, 0, 0, 0, 0], false, &LittleEndianHandler);
        let bytes = read_tag_bytes(&mut Cursor::new(Vec::new()), &le, false).unwrap();
        assert_eq!(decode_integer_values(&bytes, &le, &LittleEndianHandler).unwrap(), vec![16, 8]);

        let be = IFDEntry::from_raw(
            tags::BITS_PER_SAMPLE, field_types::SHORT, 2,
            [0, 16, 0, 8, 0, 0, 0, 0], false, &BigEndianHandler);
        assert_eq!(be.value_offset, 16);
        let bytes = read_tag_bytes(&mut Cursor::new(Vec::new()), &be, false).unwrap();
        assert_eq!(decode_integer_values(&bytes, &be, &BigEndianHandler).unwrap(), vec![16, 8]);
    }

    #[test]
    fn external_doubles_are_read_from_offset() {
        let mut file = vec![0u8; 4];
        file.extend_from_slice(&30.0f64.to_le_bytes());
        file.extend_from_slice(&(-30.0f64).to_le_bytes());

        let entry = IFDEntry::new(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 2, 4);
        let bytes = read_tag_bytes(&mut Cursor::new(file), &entry, false).unwrap();
        let values = decode_real_values(&bytes, &entry, &LittleEndianHandler).unwrap();
        assert_eq!(values, vec![30.0, -30.0]);
    }
}
