//! Streaming strip writer
//!
//! Writes a single-band, stripped TIFF one row at a time. Strips are
//! compressed and written as soon as they fill up; the directory goes at the
//! end of the file, once every strip offset is known, and the header's
//! first-IFD offset is patched to point at it.
//!
//! File layout:
//!
//! ```text
//! header | strip 0 | strip 1 | ... | IFD | external tag data
//! ```

use log::{debug, warn};
use std::collections::HashMap;
use std::io::{Seek, SeekFrom, Write};

use crate::compression::CompressionHandler;
use crate::tiff::constants::{field_types, header, photometric, planar_config, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::utils::format_utils::CLASSIC_TIFF_LIMIT;
use crate::utils::{ifd_utils, write_utils};

/// Software tag written into every output
const SOFTWARE: &str = concat!("rastercombine ", env!("CARGO_PKG_VERSION"));

/// A tag payload in little-endian byte form, ready to be placed inline or
/// out of line
#[derive(Debug, Clone, PartialEq)]
pub struct TagData {
    pub tag: u16,
    pub field_type: u16,
    pub count: u64,
    pub bytes: Vec<u8>,
}

impl TagData {
    pub fn shorts(tag: u16, values: &[u16]) -> Self {
        Self {
            tag,
            field_type: field_types::SHORT,
            count: values.len() as u64,
            bytes: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn longs(tag: u16, values: &[u32]) -> Self {
        Self {
            tag,
            field_type: field_types::LONG,
            count: values.len() as u64,
            bytes: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn long8s(tag: u16, values: &[u64]) -> Self {
        Self {
            tag,
            field_type: field_types::LONG8,
            count: values.len() as u64,
            bytes: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn doubles(tag: u16, values: &[f64]) -> Self {
        Self {
            tag,
            field_type: field_types::DOUBLE,
            count: values.len() as u64,
            bytes: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// ASCII payload; the terminating NUL is appended here
    pub fn ascii(tag: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self {
            tag,
            field_type: field_types::ASCII,
            count: bytes.len() as u64,
            bytes,
        }
    }

    /// Offsets as LONG for classic TIFF and LONG8 for BigTIFF
    fn offsets(tag: u16, values: &[u64], is_big_tiff: bool) -> Self {
        if is_big_tiff {
            Self::long8s(tag, values)
        } else {
            let narrowed: Vec<u32> = values.iter().map(|&v| v as u32).collect();
            Self::longs(tag, &narrowed)
        }
    }
}

/// Geometry and encoding of the image being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    pub width: usize,
    pub height: usize,
    /// 8, 16 or 32
    pub bits_per_sample: u16,
    pub rows_per_strip: usize,
    pub is_big_tiff: bool,
}

impl StripLayout {
    pub fn bytes_per_row(&self) -> usize {
        self.width * (self.bits_per_sample as usize / 8)
    }

    pub fn strip_count(&self) -> usize {
        if self.height == 0 {
            0
        } else {
            (self.height + self.rows_per_strip - 1) / self.rows_per_strip
        }
    }
}

/// Row-at-a-time writer for single-band unsigned TIFFs
pub struct StripWriter<W: Write + Seek> {
    writer: W,
    layout: StripLayout,
    compressor: Box<dyn CompressionHandler>,
    /// Uncompressed rows of the strip being filled
    strip_buffer: Vec<u8>,
    strip_offsets: Vec<u64>,
    strip_byte_counts: Vec<u64>,
    /// Extra tags (georeferencing) added before `finish`
    extra_tags: Vec<TagData>,
    next_row: usize,
    /// Where the next byte lands in the file
    position: u64,
}

impl<W: Write + Seek> StripWriter<W> {
    /// Writes the header placeholder and prepares for the first row
    pub fn new(mut writer: W, layout: StripLayout, compressor: Box<dyn CompressionHandler>) -> TiffResult<Self> {
        if layout.width == 0 || layout.height == 0 {
            return Err(TiffError::MissingDimensions);
        }
        if !matches!(layout.bits_per_sample, 8 | 16 | 32) {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} bits per sample", layout.bits_per_sample)));
        }
        if layout.rows_per_strip == 0 {
            return Err(TiffError::InvalidCreationOption("BLOCKYSIZE=0".to_string()));
        }

        Self::write_header(&mut writer, layout.is_big_tiff)?;
        let position = if layout.is_big_tiff { header::BIG_TIFF_HEADER_SIZE } else { header::TIFF_HEADER_SIZE };

        debug!("Strip writer: {}x{}, {} bits, {} rows per strip, {} compression, {}",
               layout.width, layout.height, layout.bits_per_sample, layout.rows_per_strip,
               compressor.name(), if layout.is_big_tiff { "BigTIFF" } else { "classic TIFF" });

        Ok(Self {
            writer,
            strip_buffer: Vec::with_capacity(layout.bytes_per_row() * layout.rows_per_strip.min(layout.height)),
            strip_offsets: Vec::with_capacity(layout.strip_count()),
            strip_byte_counts: Vec::with_capacity(layout.strip_count()),
            extra_tags: Vec::new(),
            next_row: 0,
            position,
            layout,
            compressor,
        })
    }

    /// Queues a tag to be written into the directory by `finish`
    pub fn add_tag(&mut self, data: TagData) {
        self.extra_tags.retain(|existing| existing.tag != data.tag);
        self.extra_tags.push(data);
    }

    /// Appends one row of little-endian samples
    ///
    /// Rows must arrive in order starting at 0.
    pub fn write_row_bytes(&mut self, row: usize, bytes: &[u8]) -> TiffResult<()> {
        if row >= self.layout.height {
            return Err(TiffError::RowOutOfBounds { row, height: self.layout.height });
        }
        if row != self.next_row {
            return Err(TiffError::OutOfOrderRow { expected: self.next_row, found: row });
        }
        if bytes.len() != self.layout.bytes_per_row() {
            return Err(TiffError::RowLengthMismatch {
                expected: self.layout.bytes_per_row(),
                found: bytes.len(),
            });
        }

        self.strip_buffer.extend_from_slice(bytes);
        self.next_row += 1;

        let rows_buffered = self.strip_buffer.len() / self.layout.bytes_per_row();
        if rows_buffered == self.layout.rows_per_strip || self.next_row == self.layout.height {
            self.flush_strip()?;
        }

        Ok(())
    }

    /// Compresses and writes the buffered strip
    fn flush_strip(&mut self) -> TiffResult<()> {
        let compressed = self.compressor.compress(&self.strip_buffer)?;
        let length = compressed.len() as u64;

        if !self.layout.is_big_tiff && self.position + length > CLASSIC_TIFF_LIMIT {
            return Err(TiffError::GenericError(
                "Output exceeds the 4 GiB classic TIFF limit; use BIGTIFF=YES".to_string()));
        }

        self.writer.write_all(&compressed)?;
        self.strip_offsets.push(self.position);
        self.strip_byte_counts.push(length);
        self.position += length;
        self.position += write_utils::write_padding(&mut self.writer, length)? as u64;

        self.strip_buffer.clear();
        Ok(())
    }

    /// Writes the directory and returns the underlying writer
    ///
    /// Rows that were never written are filled with zeros.
    pub fn finish(mut self) -> TiffResult<W> {
        if self.next_row < self.layout.height {
            warn!("Only {} of {} rows were written; padding the rest with zeros",
                  self.next_row, self.layout.height);
            let blank = vec![0u8; self.layout.bytes_per_row()];
            while self.next_row < self.layout.height {
                self.write_row_bytes(self.next_row, &blank)?;
            }
        }

        let is_big_tiff = self.layout.is_big_tiff;
        let mut all_tags = self.image_tags();
        all_tags.append(&mut self.extra_tags);

        let (ifd, external_data) = Self::build_ifd(&all_tags, is_big_tiff);
        let entries = write_utils::get_unique_sorted_entries(&ifd.entries);

        let ifd_offset = write_utils::align_to_4_bytes(self.position);
        let tag_data_offsets = Self::calculate_offsets(&entries, &external_data, ifd_offset, is_big_tiff);

        let end = tag_data_offsets.values().copied().max().unwrap_or(ifd_offset);
        if !is_big_tiff && end > CLASSIC_TIFF_LIMIT {
            return Err(TiffError::GenericError(
                "Output exceeds the 4 GiB classic TIFF limit; use BIGTIFF=YES".to_string()));
        }

        self.writer.seek(SeekFrom::Start(ifd_offset))?;
        Self::write_ifd(&mut self.writer, &entries, &tag_data_offsets, is_big_tiff)?;
        Self::write_external_data(&mut self.writer, &entries, &external_data, &tag_data_offsets)?;
        Self::write_first_ifd_offset(&mut self.writer, ifd_offset, is_big_tiff)?;

        self.writer.flush()?;
        debug!("Wrote {} strips and a {}-entry IFD at offset {}",
               self.strip_offsets.len(), entries.len(), ifd_offset);

        Ok(self.writer)
    }

    /// Baseline tags describing the image itself
    fn image_tags(&self) -> Vec<TagData> {
        let layout = &self.layout;
        vec![
            TagData::longs(tags::NEW_SUBFILE_TYPE, &[0]),
            TagData::longs(tags::IMAGE_WIDTH, &[layout.width as u32]),
            TagData::longs(tags::IMAGE_LENGTH, &[layout.height as u32]),
            TagData::shorts(tags::BITS_PER_SAMPLE, &[layout.bits_per_sample]),
            TagData::shorts(tags::COMPRESSION, &[self.compressor.code()]),
            TagData::shorts(tags::PHOTOMETRIC_INTERPRETATION, &[photometric::BLACK_IS_ZERO]),
            TagData::offsets(tags::STRIP_OFFSETS, &self.strip_offsets, layout.is_big_tiff),
            TagData::shorts(tags::SAMPLES_PER_PIXEL, &[1]),
            TagData::longs(tags::ROWS_PER_STRIP, &[layout.rows_per_strip.min(layout.height) as u32]),
            TagData::offsets(tags::STRIP_BYTE_COUNTS, &self.strip_byte_counts, layout.is_big_tiff),
            TagData::shorts(tags::PLANAR_CONFIGURATION, &[planar_config::CHUNKY]),
            TagData::ascii(tags::SOFTWARE, SOFTWARE),
            TagData::shorts(tags::SAMPLE_FORMAT, &[sample_format::UNSIGNED]),
        ]
    }

    /// Turns tag payloads into IFD entries plus a map of out-of-line data
    fn build_ifd(all_tags: &[TagData], is_big_tiff: bool) -> (IFD, HashMap<u16, Vec<u8>>) {
        let inline_size = ifd_utils::offset_size(is_big_tiff) as usize;
        let mut ifd = IFD::new(0, 0);
        let mut external_data = HashMap::new();

        for data in all_tags {
            if data.bytes.len() <= inline_size {
                ifd.add_entry(IFDEntry::inline(data.tag, data.field_type, data.count, &data.bytes));
            } else {
                ifd.add_entry(IFDEntry::new(data.tag, data.field_type, data.count, 0));
                external_data.insert(data.tag, data.bytes.clone());
            }
        }

        (ifd, external_data)
    }

    /// Places the external data right after the IFD, word aligned
    fn calculate_offsets(
        entries: &[IFDEntry],
        external_data: &HashMap<u16, Vec<u8>>,
        ifd_offset: u64,
        is_big_tiff: bool,
    ) -> HashMap<u16, u64> {
        let mut current_offset = ifd_offset + ifd_utils::calculate_ifd_size(entries.len(), is_big_tiff);
        let mut tag_data_offsets = HashMap::new();

        for entry in entries {
            if let Some(data) = external_data.get(&entry.tag) {
                tag_data_offsets.insert(entry.tag, current_offset);
                current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
            }
        }

        tag_data_offsets
    }

    /// Write TIFF header
    ///
    /// Always little-endian ("II"), version 42 or 43, with a zeroed
    /// placeholder for the first IFD offset.
    fn write_header(writer: &mut impl Write, is_big_tiff: bool) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?;  // Reserved (always 0)
            writer.write_all(&[0u8; 8])?;
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&[0u8; 4])?;
        }

        Ok(())
    }

    /// Write the IFD at the current position
    fn write_ifd(
        writer: &mut impl Write,
        entries: &[IFDEntry],
        tag_data_offsets: &HashMap<u16, u64>,
        is_big_tiff: bool,
    ) -> TiffResult<()> {
        match is_big_tiff {
            true => writer.write_all(&(entries.len() as u64).to_le_bytes())?,
            false => writer.write_all(&(entries.len() as u16).to_le_bytes())?,
        }

        for entry in entries {
            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;

            match is_big_tiff {
                true => writer.write_all(&entry.count.to_le_bytes())?,
                false => writer.write_all(&(entry.count as u32).to_le_bytes())?,
            }

            match (tag_data_offsets.get(&entry.tag), is_big_tiff) {
                (Some(offset), true) => writer.write_all(&offset.to_le_bytes())?,
                (Some(offset), false) => writer.write_all(&(*offset as u32).to_le_bytes())?,
                (None, true) => writer.write_all(&entry.raw_value)?,
                (None, false) => writer.write_all(&entry.raw_value[..4])?,
            }
        }

        // No next IFD
        match is_big_tiff {
            true => writer.write_all(&0u64.to_le_bytes())?,
            false => writer.write_all(&0u32.to_le_bytes())?,
        }

        Ok(())
    }

    /// Write all external tag data, in directory order
    fn write_external_data(
        writer: &mut (impl Write + Seek),
        entries: &[IFDEntry],
        external_data: &HashMap<u16, Vec<u8>>,
        tag_data_offsets: &HashMap<u16, u64>,
    ) -> TiffResult<()> {
        for entry in entries {
            if let (Some(data), Some(offset)) = (external_data.get(&entry.tag), tag_data_offsets.get(&entry.tag)) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len() as u64)?;
            }
        }

        Ok(())
    }

    /// Patch the header placeholder with the real first IFD offset
    fn write_first_ifd_offset(writer: &mut (impl Write + Seek), offset: u64, is_big_tiff: bool) -> TiffResult<()> {
        let position = if is_big_tiff { 8 } else { 4 };
        writer.seek(SeekFrom::Start(position))?;

        match is_big_tiff {
            true => writer.write_all(&offset.to_le_bytes())?,
            false => writer.write_all(&(offset as u32).to_le_bytes())?,
        }

        Ok(())
    }
}
