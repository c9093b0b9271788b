//! Sample decoding for TIFF blocks
//!
//! Turns decompressed strip or tile bytes into typed row values: undoing the
//! horizontal predictor, picking band 1 out of interleaved pixels and
//! converting from the file's byte order.

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};

use crate::io::byte_order::ByteOrder;
use crate::raster::types::{RowBuffer, SampleKind};
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Native storage type of a TIFF sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl SampleType {
    /// Maps SampleFormat and BitsPerSample onto a storage type
    pub fn from_tags(format: u16, bits: u16) -> TiffResult<Self> {
        let sample_type = match (format, bits) {
            (sample_format::UNSIGNED, 8) => SampleType::U8,
            (sample_format::UNSIGNED, 16) => SampleType::U16,
            (sample_format::UNSIGNED, 32) => SampleType::U32,
            (sample_format::UNSIGNED, 64) => SampleType::U64,
            (sample_format::SIGNED, 8) => SampleType::I8,
            (sample_format::SIGNED, 16) => SampleType::I16,
            (sample_format::SIGNED, 32) => SampleType::I32,
            (sample_format::SIGNED, 64) => SampleType::I64,
            (sample_format::IEEEFP, 32) => SampleType::F32,
            (sample_format::IEEEFP, 64) => SampleType::F64,
            _ => return Err(TiffError::UnsupportedLayout(format!(
                "sample format {} with {} bits per sample", format, bits))),
        };
        Ok(sample_type)
    }

    pub fn bytes(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::U64 | SampleType::I64 | SampleType::F64 => 8,
        }
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            SampleType::F32 | SampleType::F64 => SampleKind::Real,
            _ => SampleKind::Integer,
        }
    }
}

/// Undoes TIFF predictor 2 in place
///
/// `block` holds `rows` rows of `row_samples` samples each; differences run
/// between samples `components` apart (the samples per pixel for chunky
/// data, 1 for planar data).
pub fn undo_horizontal_predictor(
    block: &mut [u8],
    sample_type: SampleType,
    byte_order: ByteOrder,
    row_samples: usize,
    components: usize,
) -> TiffResult<()> {
    if sample_type.kind() == SampleKind::Real {
        return Err(TiffError::UnsupportedLayout(
            "horizontal predictor on floating point samples".to_string()));
    }

    match byte_order {
        ByteOrder::LittleEndian => accumulate::<LittleEndian>(block, sample_type.bytes(), row_samples, components),
        ByteOrder::BigEndian => accumulate::<BigEndian>(block, sample_type.bytes(), row_samples, components),
    }
    Ok(())
}

fn accumulate<E: Endian>(block: &mut [u8], width: usize, row_samples: usize, components: usize) {
    let row_bytes = row_samples * width;
    if row_bytes == 0 {
        return;
    }

    for row in block.chunks_exact_mut(row_bytes) {
        for i in components..row_samples {
            let (prev_at, at) = ((i - components) * width, i * width);
            match width {
                1 => row[at] = row[at].wrapping_add(row[prev_at]),
                2 => {
                    let value = E::read_u16(&row[at..]).wrapping_add(E::read_u16(&row[prev_at..]));
                    E::write_u16(&mut row[at..], value);
                }
                4 => {
                    let value = E::read_u32(&row[at..]).wrapping_add(E::read_u32(&row[prev_at..]));
                    E::write_u32(&mut row[at..], value);
                }
                _ => {
                    let value = E::read_u64(&row[at..]).wrapping_add(E::read_u64(&row[prev_at..]));
                    E::write_u64(&mut row[at..], value);
                }
            }
        }
    }
}

/// Converts `count` samples from `bytes` into `out`
///
/// Consecutive samples start `stride` bytes apart, so band 1 of
/// pixel-interleaved data can be read without copying it out first.
/// `out` must already have the kind of `sample_type` and room for
/// `offset + count` values.
pub fn convert_samples(
    bytes: &[u8],
    stride: usize,
    count: usize,
    sample_type: SampleType,
    byte_order: ByteOrder,
    out: &mut RowBuffer,
    offset: usize,
) -> TiffResult<()> {
    let needed = if count == 0 { 0 } else { (count - 1) * stride + sample_type.bytes() };
    if bytes.len() < needed {
        return Err(TiffError::GenericError(format!(
            "Block holds {} bytes, {} needed", bytes.len(), needed)));
    }

    match byte_order {
        ByteOrder::LittleEndian => convert::<LittleEndian>(bytes, stride, count, sample_type, out, offset),
        ByteOrder::BigEndian => convert::<BigEndian>(bytes, stride, count, sample_type, out, offset),
    }
}

fn convert<E: Endian>(
    bytes: &[u8],
    stride: usize,
    count: usize,
    sample_type: SampleType,
    out: &mut RowBuffer,
    offset: usize,
) -> TiffResult<()> {
    let at = |i: usize| &bytes[i * stride..];

    match out {
        RowBuffer::Integer(values) => {
            let target = &mut values[offset..offset + count];
            for (i, value) in target.iter_mut().enumerate() {
                *value = match sample_type {
                    SampleType::U8 => at(i)[0] as i64,
                    SampleType::I8 => at(i)[0] as i8 as i64,
                    SampleType::U16 => E::read_u16(at(i)) as i64,
                    SampleType::I16 => E::read_i16(at(i)) as i64,
                    SampleType::U32 => E::read_u32(at(i)) as i64,
                    SampleType::I32 => E::read_i32(at(i)) as i64,
                    SampleType::I64 => E::read_i64(at(i)),
                    SampleType::U64 => {
                        let raw = E::read_u64(at(i));
                        i64::try_from(raw).map_err(|_| TiffError::UnsupportedLayout(format!(
                            "unsigned 64-bit sample {} exceeds the signed 64-bit range", raw)))?
                    }
                    SampleType::F32 | SampleType::F64 => return Err(kind_mismatch(sample_type, SampleKind::Integer)),
                };
            }
        }
        RowBuffer::Real(values) => {
            let target = &mut values[offset..offset + count];
            for (i, value) in target.iter_mut().enumerate() {
                *value = match sample_type {
                    SampleType::F32 => E::read_f32(at(i)) as f64,
                    SampleType::F64 => E::read_f64(at(i)),
                    _ => return Err(kind_mismatch(sample_type, SampleKind::Real)),
                };
            }
        }
    }

    Ok(())
}

fn kind_mismatch(sample_type: SampleType, buffer_kind: SampleKind) -> TiffError {
    TiffError::GenericError(format!(
        "{:?} samples cannot be decoded into a {} row buffer", sample_type, buffer_kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_types_follow_tags() {
        assert_eq!(SampleType::from_tags(1, 16).unwrap(), SampleType::U16);
        assert_eq!(SampleType::from_tags(2, 8).unwrap().kind(), SampleKind::Integer);
        assert_eq!(SampleType::from_tags(3, 32).unwrap().kind(), SampleKind::Real);
        assert!(SampleType::from_tags(3, 16).is_err());
        assert!(SampleType::from_tags(1, 12).is_err());
    }

    #[test]
    fn predictor_accumulates_per_component() {
        // Two RGB-ish pixels of u8, components interleaved
        let mut block = vec![10, 20, 30, 1, 2, 3];
        undo_horizontal_predictor(&mut block, SampleType::U8, ByteOrder::LittleEndian, 6, 3).unwrap();
        assert_eq!(block, vec![10, 20, 30, 11, 22, 33]);

        let mut block: Vec<u8> = [100u16, 5, 0xFFFF].iter().flat_map(|v| v.to_be_bytes()).collect();
        undo_horizontal_predictor(&mut block, SampleType::U16, ByteOrder::BigEndian, 3, 1).unwrap();
        let decoded: Vec<u16> = block.chunks(2).map(BigEndian::read_u16).collect();
        assert_eq!(decoded, vec![100, 105, 104]);
    }

    #[test]
    fn band_one_is_picked_from_interleaved_pixels() {
        let bytes: Vec<u8> = [-3i16, 7, 12, 9].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut out = RowBuffer::Integer(vec![0; 2]);
        convert_samples(&bytes, 4, 2, SampleType::I16, ByteOrder::LittleEndian, &mut out, 0).unwrap();
        assert_eq!(out, RowBuffer::Integer(vec![-3, 12]));
    }

    #[test]
    fn floats_decode_into_real_buffers_only() {
        let bytes: Vec<u8> = [1.5f32, -2.25].iter().flat_map(|v| v.to_be_bytes()).collect();
        let mut out = RowBuffer::Real(vec![0.0; 2]);
        convert_samples(&bytes, 4, 2, SampleType::F32, ByteOrder::BigEndian, &mut out, 0).unwrap();
        assert_eq!(out, RowBuffer::Real(vec![1.5, -2.25]));

        let mut wrong = RowBuffer::Integer(vec![0; 2]);
        assert!(convert_samples(&bytes, 4, 2, SampleType::F32, ByteOrder::BigEndian, &mut wrong, 0).is_err());
    }
}
