//! Hand-built TIFF fixtures

use std::io::Cursor;
use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian, WriteBytesExt};

/// Classic little-endian TIFF with ImageWidth=800 and ImageLength=600
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();    // ImageWidth
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(800).unwrap();

    buffer.write_u16::<LittleEndian>(257).unwrap();    // ImageLength
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(600).unwrap();

    buffer.write_u32::<LittleEndian>(0).unwrap();      // No next IFD

    Cursor::new(buffer)
}

/// Little-endian BigTIFF with ImageWidth=1024 and ImageLength=768
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(1024).unwrap();

    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(768).unwrap();

    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Classic big-endian TIFF whose entries use SHORT values
///
/// ImageWidth=300 (SHORT), ImageLength=200 (SHORT), BitsPerSample=16,16
/// (two SHORTs packed inline) and a DOUBLE pixel scale stored out of line.
pub fn create_big_endian_short_buffer() -> Cursor<Vec<u8>> {
    fn entry(buffer: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: [u8; 4]) {
        buffer.write_u16::<BigEndian>(tag).unwrap();
        buffer.write_u16::<BigEndian>(field_type).unwrap();
        buffer.write_u32::<BigEndian>(count).unwrap();
        buffer.extend_from_slice(&value);
    }

    fn short_pair(a: u16, b: u16) -> [u8; 4] {
        let mut value = [0u8; 4];
        BigEndian::write_u16(&mut value[..2], a);
        BigEndian::write_u16(&mut value[2..], b);
        value
    }

    let mut buffer = Vec::new();
    buffer.extend_from_slice(b"MM");
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(8).unwrap();

    let entry_count = 4u16;
    let scale_offset = 8 + 2 + 12 * entry_count as u32 + 4;

    buffer.write_u16::<BigEndian>(entry_count).unwrap();
    entry(&mut buffer, 256, 3, 1, short_pair(300, 0));
    entry(&mut buffer, 257, 3, 1, short_pair(200, 0));
    entry(&mut buffer, 258, 3, 2, short_pair(16, 16));
    entry(&mut buffer, 33550, 12, 3, scale_offset.to_be_bytes());
    buffer.write_u32::<BigEndian>(0).unwrap();

    for value in [2.5f64, 2.5, 0.0] {
        buffer.write_f64::<BigEndian>(value).unwrap();
    }

    Cursor::new(buffer)
}
