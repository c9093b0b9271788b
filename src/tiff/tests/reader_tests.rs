//! Tests for the TIFF reader

use super::test_utils::{create_big_endian_short_buffer, create_test_bigtiff_buffer, create_test_tiff_buffer};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffError;
use crate::tiff::reader::TiffReader;
use std::io::Cursor;

#[test]
fn test_reads_classic_header_and_dimensions() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 1);
    assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((800, 600)));
}

#[test]
fn test_reads_bigtiff_header_and_dimensions() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());
    assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_big_endian_shorts_decode_inline() {
    let mut cursor = create_big_endian_short_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    assert_eq!(ifd.get_dimensions(), Some((300, 200)));
    assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(), vec![16, 16]);
    assert_eq!(reader.read_tag_doubles(&mut cursor, ifd, tags::MODEL_PIXEL_SCALE_TAG).unwrap(),
               vec![2.5, 2.5, 0.0]);
    assert_eq!(reader.read_tag_or(&mut cursor, ifd, tags::SAMPLES_PER_PIXEL, 1).unwrap(), 1);
}

#[test]
fn test_missing_tag_is_reported() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let result = reader.read_tag_values(&mut cursor, tiff.main_ifd().unwrap(), tags::STRIP_OFFSETS);
    assert!(matches!(result, Err(TiffError::TagNotFound(273))));
}

#[test]
fn test_rejects_unknown_version() {
    let mut cursor = Cursor::new(vec![0x49, 0x49, 41, 0, 8, 0, 0, 0]);
    let result = TiffReader::new().read(&mut cursor);
    assert!(matches!(result, Err(TiffError::UnsupportedVersion(41))));
}
