//! GeoTIFF raster sink
//!
//! Creates a single-band, stripped, little-endian GeoTIFF of unsigned
//! identifiers. Georeferencing set before the first row is written into the
//! directory when the file is finalized.

use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;

use crate::compression::{CompressionFactory, ZSTD_MAX_LEVEL, ZSTD_MIN_LEVEL};
use crate::raster::sink::RasterSink;
use crate::raster::types::{GeoTransform, OutputDataType, Projection};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geotags;
use crate::tiff::writer::{StripLayout, StripWriter};
use crate::utils::creation_options::CreationOptions;
use crate::utils::format_utils;

/// Target uncompressed strip size when BLOCKYSIZE is not given
const DEFAULT_STRIP_BYTES: usize = 8192;

/// Creation options understood by the GTiff driver
const KNOWN_OPTIONS: [&str; 4] = ["COMPRESS", "ZSTD_LEVEL", "BLOCKYSIZE", "BIGTIFF"];

/// How the BIGTIFF option resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigTiffMode {
    Yes,
    No,
    IfNeeded,
}

/// GTiff creation options after validation
#[derive(Debug, Clone, PartialEq)]
pub struct GTiffOptions {
    pub compress: String,
    pub zstd_level: i32,
    pub rows_per_strip: usize,
    pub big_tiff: BigTiffMode,
}

impl GTiffOptions {
    /// Interprets creation options for a `width` x `height` raster
    ///
    /// Unknown names are ignored with a warning; bad values are errors.
    pub fn from_options(options: &CreationOptions, width: usize, height: usize, data_type: OutputDataType) -> TiffResult<Self> {
        for name in options.names() {
            if !KNOWN_OPTIONS.contains(&name) {
                warn!("Creation option {} is not supported by the GTiff driver and is ignored", name);
            }
        }

        let compress = options.get("COMPRESS").unwrap_or("NONE").to_ascii_uppercase();
        let zstd_level = options.get_int("ZSTD_LEVEL", ZSTD_MIN_LEVEL as i64, ZSTD_MAX_LEVEL as i64)?
            .unwrap_or(3) as i32;

        let row_bytes = (width * data_type.bytes_per_sample()).max(1);
        let rows_per_strip = match options.get_int("BLOCKYSIZE", 1, u32::MAX as i64)? {
            Some(rows) => rows as usize,
            None => (DEFAULT_STRIP_BYTES / row_bytes).max(1),
        }
        .min(height.max(1));

        let big_tiff = match options.get("BIGTIFF").map(str::to_ascii_uppercase).as_deref() {
            None | Some("IF_NEEDED") | Some("IF_SAFER") => BigTiffMode::IfNeeded,
            Some("YES") | Some("TRUE") | Some("ON") => BigTiffMode::Yes,
            Some("NO") | Some("FALSE") | Some("OFF") => BigTiffMode::No,
            Some(other) => return Err(TiffError::InvalidCreationOption(format!(
                "BIGTIFF={} (expected YES, NO or IF_NEEDED)", other))),
        };

        Ok(Self { compress, zstd_level, rows_per_strip, big_tiff })
    }

    /// Whether the file will be written as BigTIFF
    ///
    /// IF_NEEDED goes by the uncompressed size, so compressed output that
    /// would have fit is still written as BigTIFF.
    pub fn resolve_big_tiff(&self, width: usize, height: usize, data_type: OutputDataType) -> bool {
        match self.big_tiff {
            BigTiffMode::Yes => true,
            BigTiffMode::No => false,
            BigTiffMode::IfNeeded => {
                let estimated = (width as u64) * (height as u64) * data_type.bytes_per_sample() as u64;
                format_utils::needs_big_tiff(estimated)
            }
        }
    }
}

/// An output identifier raster in a GeoTIFF file
pub struct TiffRasterSink {
    path: String,
    data_type: OutputDataType,
    width: usize,
    height: usize,
    /// `None` once finalized
    writer: Option<StripWriter<BufWriter<File>>>,
    /// Packed little-endian samples of the row being written
    row_bytes: Vec<u8>,
    clamped: u64,
}

impl TiffRasterSink {
    /// Creates (truncating) the file at `path`
    pub fn create(
        path: &str,
        width: usize,
        height: usize,
        data_type: OutputDataType,
        options: &CreationOptions,
    ) -> TiffResult<Self> {
        let gtiff_options = GTiffOptions::from_options(options, width, height, data_type)?;
        let compressor = CompressionFactory::get_handler_by_name(&gtiff_options.compress, gtiff_options.zstd_level)?;

        let layout = StripLayout {
            width,
            height,
            bits_per_sample: data_type.bits_per_sample() as u16,
            rows_per_strip: gtiff_options.rows_per_strip,
            is_big_tiff: gtiff_options.resolve_big_tiff(width, height, data_type),
        };

        let file = File::create(path)?;
        let writer = StripWriter::new(BufWriter::with_capacity(1024 * 1024, file), layout, compressor)?;

        info!("Created {} ({}x{} {}, {} compression, {} rows per strip)",
              path, width, height, data_type, gtiff_options.compress, layout.rows_per_strip);

        Ok(Self {
            path: path.to_string(),
            data_type,
            width,
            height,
            writer: Some(writer),
            row_bytes: Vec::with_capacity(width * data_type.bytes_per_sample()),
            clamped: 0,
        })
    }

    fn writer_mut(&mut self) -> TiffResult<&mut StripWriter<BufWriter<File>>> {
        self.writer.as_mut()
            .ok_or_else(|| TiffError::GenericError(format!("{} is already finalized", self.path)))
    }
}

impl RasterSink for TiffRasterSink {
    fn description(&self) -> &str {
        &self.path
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn data_type(&self) -> OutputDataType {
        self.data_type
    }

    fn set_geo_transform(&mut self, transform: &GeoTransform) -> TiffResult<()> {
        let writer = self.writer_mut()?;
        for tag in geotags::geo_transform_tags(transform) {
            writer.add_tag(tag);
        }
        Ok(())
    }

    fn set_projection(&mut self, projection: &Projection) -> TiffResult<()> {
        let writer = self.writer_mut()?;
        for tag in geotags::projection_tags(projection) {
            writer.add_tag(tag);
        }
        Ok(())
    }

    fn write_row(&mut self, row: usize, ids: &[u32]) -> TiffResult<()> {
        if ids.len() != self.width {
            return Err(TiffError::RowLengthMismatch { expected: self.width, found: ids.len() });
        }

        let data_type = self.data_type;
        let max = data_type.max_value();
        self.row_bytes.clear();
        for &id in ids {
            if id > max {
                self.clamped += 1;
            }
            let value = data_type.clamp(id);
            match data_type {
                OutputDataType::Byte => self.row_bytes.push(value as u8),
                OutputDataType::UInt16 => self.row_bytes.extend_from_slice(&(value as u16).to_le_bytes()),
                OutputDataType::UInt32 => self.row_bytes.extend_from_slice(&value.to_le_bytes()),
            }
        }

        let row_bytes = std::mem::take(&mut self.row_bytes);
        let result = self.writer_mut().and_then(|writer| writer.write_row_bytes(row, &row_bytes));
        self.row_bytes = row_bytes;
        result
    }

    fn finalize(&mut self) -> TiffResult<()> {
        let writer = self.writer.take()
            .ok_or_else(|| TiffError::GenericError(format!("{} is already finalized", self.path)))?;
        writer.finish()?;

        if self.clamped > 0 {
            debug!("{} pixels of {} were clamped to {}", self.clamped, self.path, self.data_type.max_value());
        }
        Ok(())
    }
}
