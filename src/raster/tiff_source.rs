//! GeoTIFF raster source
//!
//! Reads band 1 of the first image in a TIFF or BigTIFF file, a row at a
//! time. The strip (or row of tiles) holding the last requested row stays
//! decoded, so a top-to-bottom scan decompresses every block exactly once.

use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::raster::decode::{self, SampleType};
use crate::raster::source::RasterSource;
use crate::raster::types::{GeoTransform, Projection, RowBuffer, SampleKind};
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geotags;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;
use crate::utils::tag_utils;

/// Where the blocks of band 1 live
#[derive(Debug)]
enum BlockLayout {
    Strips {
        rows_per_strip: usize,
        offsets: Vec<u64>,
        byte_counts: Vec<u64>,
    },
    Tiles {
        tile_width: usize,
        tile_length: usize,
        tiles_across: usize,
        offsets: Vec<u64>,
        byte_counts: Vec<u64>,
    },
}

/// Decoded blocks covering the most recently read band of rows
struct BlockCache {
    /// Strip index, or tile row index
    index: usize,
    blocks: Vec<Vec<u8>>,
}

/// Band 1 of a GeoTIFF, opened for row reads
pub struct TiffRasterSource {
    path: String,
    reader: BufReader<File>,
    byte_order: ByteOrder,
    width: usize,
    height: usize,
    sample_type: SampleType,
    /// Samples per pixel within a block (1 for planar data)
    components: usize,
    use_predictor: bool,
    codec: Box<dyn CompressionHandler>,
    layout: BlockLayout,
    cache: Option<BlockCache>,
    geo_transform: Option<GeoTransform>,
    projection: Option<Projection>,
}

impl TiffRasterSource {
    /// Opens `path` and validates that its layout can be decoded
    pub fn open(path: &str) -> TiffResult<Self> {
        let file = File::open(Path::new(path))?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(&mut reader)?;
        let ifd = tiff.main_ifd().ok_or(TiffError::MissingDimensions)?;

        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as usize, height as usize);

        let samples_per_pixel = tiff_reader.read_tag_or(&mut reader, ifd, tags::SAMPLES_PER_PIXEL, 1)? as usize;
        let planar = tiff_reader.read_tag_or(&mut reader, ifd, tags::PLANAR_CONFIGURATION, planar_config::CHUNKY as u64)? as u16;
        let components = if planar == planar_config::PLANAR { 1 } else { samples_per_pixel.max(1) };

        // Per-sample tags: only band 1 matters
        let bits = tiff_reader.read_tag_or(&mut reader, ifd, tags::BITS_PER_SAMPLE, 1)? as u16;
        let format = tiff_reader.read_tag_or(&mut reader, ifd, tags::SAMPLE_FORMAT, sample_format::UNSIGNED as u64)? as u16;
        let sample_type = SampleType::from_tags(format, bits)?;

        let compression_code = tiff_reader.read_tag_or(&mut reader, ifd, tags::COMPRESSION, compression::NONE as u64)?;
        let codec = CompressionFactory::create_handler(compression_code)?;

        let use_predictor = match tiff_reader.read_tag_or(&mut reader, ifd, tags::PREDICTOR, predictor::NONE as u64)? as u16 {
            predictor::NONE => false,
            predictor::HORIZONTAL_DIFFERENCING if sample_type.kind() == SampleKind::Integer => true,
            other => return Err(TiffError::UnsupportedLayout(format!(
                "predictor {} on {:?} samples", other, sample_type))),
        };

        let planes = if planar == planar_config::PLANAR { samples_per_pixel.max(1) } else { 1 };
        let file_size = validation::get_file_size(&mut reader)?;
        let layout = Self::read_layout(&tiff_reader, &mut reader, ifd, width, height, planes, file_size)?;

        let geo_transform = geotags::read_geo_transform(&tiff_reader, &mut reader, ifd)?;
        let projection = geotags::read_projection(&tiff_reader, &mut reader, ifd)?;

        info!("Opened {}: {}x{}, {:?}, {} compression, {}",
              path, width, height, sample_type,
              tag_utils::get_compression_name(compression_code),
              if ifd.is_tiled() { "tiled" } else { "stripped" });
        debug!("{} byte order, {} samples per pixel, planar configuration {}, {}",
               tiff.byte_order.name(), samples_per_pixel, planar,
               if ifd.has_georeferencing() { "georeferenced" } else { "not georeferenced" });

        Ok(Self {
            path: path.to_string(),
            reader,
            byte_order: tiff.byte_order,
            width,
            height,
            sample_type,
            components,
            use_predictor,
            codec,
            layout,
            cache: None,
            geo_transform,
            projection,
        })
    }

    /// Reads block offsets, keeping only those of the first plane
    ///
    /// Every kept block must lie inside the file, so a corrupt byte count
    /// cannot drive an oversized read buffer.
    fn read_layout(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        width: usize,
        height: usize,
        planes: usize,
        file_size: u64,
    ) -> TiffResult<BlockLayout> {
        if ifd.is_tiled() {
            let tile_width = tiff_reader.read_tag_or(reader, ifd, tags::TILE_WIDTH, 0)? as usize;
            let tile_length = tiff_reader.read_tag_or(reader, ifd, tags::TILE_LENGTH, 0)? as usize;
            if tile_width == 0 || tile_length == 0 {
                return Err(TiffError::UnsupportedLayout("zero tile size".to_string()));
            }

            let tiles_across = (width + tile_width - 1) / tile_width;
            let tiles_down = (height + tile_length - 1) / tile_length;
            let per_plane = tiles_across * tiles_down;

            let offsets = tiff_reader.read_tag_values(reader, ifd, tags::TILE_OFFSETS)?;
            let byte_counts = tiff_reader.read_tag_values(reader, ifd, tags::TILE_BYTE_COUNTS)?;
            Self::check_block_count(offsets.len().min(byte_counts.len()), per_plane * planes, "tiles")?;
            Self::check_block_extents(&offsets[..per_plane], &byte_counts[..per_plane], file_size)?;

            Ok(BlockLayout::Tiles {
                tile_width,
                tile_length,
                tiles_across,
                offsets: offsets[..per_plane].to_vec(),
                byte_counts: byte_counts[..per_plane].to_vec(),
            })
        } else {
            let rows_per_strip = (tiff_reader.read_tag_or(reader, ifd, tags::ROWS_PER_STRIP, height as u64)? as usize)
                .clamp(1, height.max(1));
            let per_plane = (height + rows_per_strip - 1) / rows_per_strip;

            let offsets = tiff_reader.read_tag_values(reader, ifd, tags::STRIP_OFFSETS)?;
            let byte_counts = tiff_reader.read_tag_values(reader, ifd, tags::STRIP_BYTE_COUNTS)?;
            Self::check_block_count(offsets.len().min(byte_counts.len()), per_plane * planes, "strips")?;
            Self::check_block_extents(&offsets[..per_plane], &byte_counts[..per_plane], file_size)?;

            Ok(BlockLayout::Strips {
                rows_per_strip,
                offsets: offsets[..per_plane].to_vec(),
                byte_counts: byte_counts[..per_plane].to_vec(),
            })
        }
    }

    fn check_block_count(found: usize, expected: usize, what: &str) -> TiffResult<()> {
        if found < expected {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} {} listed, {} needed", found, what, expected)));
        }
        Ok(())
    }

    fn check_block_extents(offsets: &[u64], byte_counts: &[u64], file_size: u64) -> TiffResult<()> {
        for (&offset, &byte_count) in offsets.iter().zip(byte_counts) {
            validation::validate_block_extent(offset, byte_count, file_size)?;
        }
        Ok(())
    }

    /// Reads and decodes one block holding `rows` rows of `row_samples` samples
    fn load_block(&mut self, offset: u64, byte_count: u64, rows: usize, row_samples: usize) -> TiffResult<Vec<u8>> {
        let mut packed = vec![0u8; byte_count as usize];
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(&mut packed)?;

        let expected_len = rows * row_samples * self.sample_type.bytes();
        let mut block = self.codec.decompress(&packed, expected_len)?;
        block.truncate(expected_len);

        if self.use_predictor {
            decode::undo_horizontal_predictor(&mut block, self.sample_type, self.byte_order,
                                              row_samples, self.components)?;
        }
        Ok(block)
    }

    /// Makes sure the blocks covering `row` are decoded
    fn ensure_cached(&mut self, row: usize) -> TiffResult<()> {
        let (index, requests) = match &self.layout {
            BlockLayout::Strips { rows_per_strip, offsets, byte_counts } => {
                let strip = row / rows_per_strip;
                let rows = (*rows_per_strip).min(self.height - strip * rows_per_strip);
                (strip, vec![(offsets[strip], byte_counts[strip], rows, self.width * self.components)])
            }
            BlockLayout::Tiles { tile_width, tile_length, tiles_across, offsets, byte_counts } => {
                let tile_row = row / tile_length;
                let requests = (0..*tiles_across)
                    .map(|col| {
                        let tile = tile_row * tiles_across + col;
                        (offsets[tile], byte_counts[tile], *tile_length, tile_width * self.components)
                    })
                    .collect();
                (tile_row, requests)
            }
        };

        if self.cache.as_ref().map_or(false, |cache| cache.index == index) {
            return Ok(());
        }

        let mut blocks = Vec::with_capacity(requests.len());
        for (offset, byte_count, rows, row_samples) in requests {
            blocks.push(self.load_block(offset, byte_count, rows, row_samples)?);
        }
        self.cache = Some(BlockCache { index, blocks });
        Ok(())
    }
}

/// The bytes of `block` from `start`, empty if the block is short
fn block_tail(block: &[u8], start: usize) -> &[u8] {
    block.get(start..).unwrap_or(&[])
}

impl RasterSource for TiffRasterSource {
    fn description(&self) -> &str {
        &self.path
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sample_kind(&self) -> SampleKind {
        self.sample_type.kind()
    }

    fn read_row(&mut self, row: usize, buffer: &mut RowBuffer) -> TiffResult<()> {
        if row >= self.height {
            return Err(TiffError::RowOutOfBounds { row, height: self.height });
        }
        if buffer.len() != self.width {
            return Err(TiffError::RowLengthMismatch { expected: self.width, found: buffer.len() });
        }

        self.ensure_cached(row)?;
        let blocks = match &self.cache {
            Some(cache) => &cache.blocks,
            None => return Err(TiffError::GenericError("Block cache is empty".to_string())),
        };

        let sample_bytes = self.sample_type.bytes();
        let pixel_stride = sample_bytes * self.components;

        match &self.layout {
            BlockLayout::Strips { rows_per_strip, .. } => {
                let row_bytes = self.width * pixel_stride;
                let start = (row % rows_per_strip) * row_bytes;
                decode::convert_samples(block_tail(&blocks[0], start), pixel_stride, self.width,
                                        self.sample_type, self.byte_order, buffer, 0)?;
            }
            BlockLayout::Tiles { tile_width, tile_length, .. } => {
                let row_bytes = tile_width * pixel_stride;
                let start = (row % tile_length) * row_bytes;
                for (col, block) in blocks.iter().enumerate() {
                    let first_x = col * tile_width;
                    let count = (*tile_width).min(self.width - first_x);
                    decode::convert_samples(block_tail(block, start), pixel_stride, count,
                                            self.sample_type, self.byte_order, buffer, first_x)?;
                }
            }
        }

        Ok(())
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        self.geo_transform
    }

    fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }
}
