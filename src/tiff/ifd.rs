//! Image File Directory (IFD) structures and methods
//!
//! IFDs hold the tag entries describing one image in a TIFF file. The reader
//! builds them from disk; the strip writer builds one in memory and
//! serializes it once all strips are on disk.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::tags;
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// `value_offset` is the decoded first value when the data fits inline, or
/// the file offset of the data otherwise. `raw_value` keeps the value field
/// exactly as stored so inline arrays (two SHORTs, say) can still be decoded.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Undecoded value field (4 bytes used for classic TIFF, 8 for BigTIFF)
    pub raw_value: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry whose value field is `value_offset` in little-endian form
    ///
    /// This is how the writer builds entries; everything it emits is
    /// little-endian.
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw_value: value_offset.to_le_bytes(),
        }
    }

    /// Creates an entry whose little-endian payload fits in the value field
    ///
    /// `bytes` must be no longer than the value field (4 or 8 bytes).
    pub fn inline(tag: u16, field_type: u16, count: u64, bytes: &[u8]) -> Self {
        let mut raw_value = [0u8; 8];
        raw_value[..bytes.len()].copy_from_slice(bytes);
        Self {
            tag,
            field_type,
            count,
            value_offset: u64::from_le_bytes(raw_value),
            raw_value,
        }
    }

    /// Creates an entry from the value field bytes read out of a file
    pub fn from_raw(
        tag: u16,
        field_type: u16,
        count: u64,
        raw_value: [u8; 8],
        is_big_tiff: bool,
        handler: &dyn ByteOrderHandler,
    ) -> Self {
        let mut entry = Self { tag, field_type, count, value_offset: 0, raw_value };

        entry.value_offset = if entry.is_value_inline(is_big_tiff) && count > 0 {
            // Decode the first value according to its own width, otherwise a
            // big-endian SHORT would come out shifted by 16 bits.
            match tag_utils::get_field_type_size(field_type) {
                1 => raw_value[0] as u64,
                2 => handler.u16_from(&raw_value) as u64,
                4 => handler.u32_from(&raw_value) as u64,
                _ => handler.u64_from(&raw_value),
            }
        } else if is_big_tiff {
            handler.u64_from(&raw_value)
        } else {
            handler.u32_from(&raw_value) as u64
        };

        trace!("Read IFD entry: tag={} ({}), type={} ({}), count={}, value/offset={}",
               tag, tag_utils::get_tag_name(tag),
               field_type, tag_utils::get_field_type_name(field_type),
               count, entry.value_offset);

        entry
    }

    /// Get the size in bytes for this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        tag_utils::get_field_type_size(self.field_type)
    }

    /// Determines if the value is stored inline in the value field
    /// rather than at the offset location
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let total_size = self.get_field_type_size() as u64 * self.count;
        let inline_size = if is_big_tiff { 8 } else { 4 };
        total_size <= inline_size
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let value_display = match self.tag {
            tags::COMPRESSION => format!("{} ({})",
                                         self.value_offset,
                                         tag_utils::get_compression_name(self.value_offset)),
            _ => self.value_offset.to_string(),
        };

        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_utils::get_tag_name(self.tag),
                self.field_type, tag_utils::get_field_type_name(self.field_type),
                self.count, value_display)
    }
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Adds an entry, dropping any earlier entry with the same tag
    pub fn replace_entry(&mut self, entry: IFDEntry) {
        self.entries.retain(|e| e.tag != entry.tag);
        self.add_entry(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the dimensions of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Returns number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether the image data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_OFFSETS)
    }

    /// Whether any GeoTIFF georeferencing tag is present
    pub fn has_georeferencing(&self) -> bool {
        [
            tags::MODEL_PIXEL_SCALE_TAG,
            tags::MODEL_TIEPOINT_TAG,
            tags::MODEL_TRANSFORMATION_TAG,
            tags::GEO_KEY_DIRECTORY_TAG,
        ]
        .iter()
        .any(|&tag| self.has_tag(tag))
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;

        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {} ({}): {} [{}]",
                     entry.tag, tag_utils::get_tag_name(entry.tag),
                     entry.value_offset, tag_utils::get_field_type_name(entry.field_type))?;
        }

        Ok(())
    }
}
