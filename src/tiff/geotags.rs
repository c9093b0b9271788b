//! GeoTIFF georeferencing tags
//!
//! Converts between the GeoTIFF tag set and the two pieces of
//! georeferencing a raster carries: the affine geotransform and the
//! projection (GeoKey directory with its parameter tags).

use log::{debug, warn};

use crate::io::seekable::SeekableReader;
use crate::raster::types::{GeoTransform, Projection};
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::writer::TagData;

/// Reads the geotransform of an image, if it has one
///
/// `ModelTransformationTag` wins when present; otherwise the first tiepoint
/// is combined with `ModelPixelScaleTag`.
pub fn read_geo_transform(
    tiff_reader: &TiffReader,
    reader: &mut dyn SeekableReader,
    ifd: &IFD,
) -> TiffResult<Option<GeoTransform>> {
    if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
        let matrix = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        if matrix.len() < 16 {
            warn!("ModelTransformationTag has {} values, expected 16; ignoring", matrix.len());
            return Ok(None);
        }
        return Ok(Some(GeoTransform([
            matrix[3], matrix[0], matrix[1],
            matrix[7], matrix[4], matrix[5],
        ])));
    }

    if !ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) || !ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
        return Ok(None);
    }

    let scale = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
    let tiepoint = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        warn!("Incomplete pixel scale ({} values) or tiepoint ({} values); ignoring",
              scale.len(), tiepoint.len());
        return Ok(None);
    }

    // Tiepoint is (i, j, k, x, y, z): raster (i, j) sits at world (x, y)
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let (scale_x, scale_y) = (scale[0], scale[1]);

    Ok(Some(GeoTransform([
        x - i * scale_x, scale_x, 0.0,
        y + j * scale_y, 0.0, -scale_y,
    ])))
}

/// Reads the GeoKey directory and its parameter tags, if present
pub fn read_projection(
    tiff_reader: &TiffReader,
    reader: &mut dyn SeekableReader,
    ifd: &IFD,
) -> TiffResult<Option<Projection>> {
    if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
        return Ok(None);
    }

    let geo_key_directory = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?
        .into_iter()
        .map(|v| v as u16)
        .collect();

    let double_params = if ifd.has_tag(tags::GEO_DOUBLE_PARAMS_TAG) {
        tiff_reader.read_tag_doubles(reader, ifd, tags::GEO_DOUBLE_PARAMS_TAG)?
    } else {
        Vec::new()
    };

    let ascii_params = if ifd.has_tag(tags::GEO_ASCII_PARAMS_TAG) {
        tiff_reader.read_tag_ascii(reader, ifd, tags::GEO_ASCII_PARAMS_TAG)?
    } else {
        String::new()
    };

    let projection = Projection { geo_key_directory, double_params, ascii_params };
    debug!("Read projection with {} GeoKeys", projection.geo_keys().count());
    Ok(Some(projection))
}

/// Tags encoding a geotransform
///
/// North-up transforms use pixel scale plus a tiepoint at the raster
/// origin; anything rotated needs the full transformation matrix.
pub fn geo_transform_tags(transform: &GeoTransform) -> Vec<TagData> {
    let [x0, dx, rx, y0, ry, dy] = transform.0;

    if transform.is_north_up() {
        vec![
            TagData::doubles(tags::MODEL_PIXEL_SCALE_TAG, &[dx, -dy, 0.0]),
            TagData::doubles(tags::MODEL_TIEPOINT_TAG, &[0.0, 0.0, 0.0, x0, y0, 0.0]),
        ]
    } else {
        vec![TagData::doubles(tags::MODEL_TRANSFORMATION_TAG, &[
            dx, rx, 0.0, x0,
            ry, dy, 0.0, y0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])]
    }
}

/// Tags carrying a projection verbatim
pub fn projection_tags(projection: &Projection) -> Vec<TagData> {
    let mut result = Vec::with_capacity(3);

    if projection.geo_key_directory.is_empty() {
        return result;
    }
    result.push(TagData::shorts(tags::GEO_KEY_DIRECTORY_TAG, &projection.geo_key_directory));

    if !projection.double_params.is_empty() {
        result.push(TagData::doubles(tags::GEO_DOUBLE_PARAMS_TAG, &projection.double_params));
    }
    if !projection.ascii_params.is_empty() {
        result.push(TagData::ascii(tags::GEO_ASCII_PARAMS_TAG, &projection.ascii_params));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn north_up_transform_uses_scale_and_tiepoint() {
        let written = geo_transform_tags(&GeoTransform([500000.0, 30.0, 0.0, 4100000.0, 0.0, -30.0]));
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], TagData::doubles(tags::MODEL_PIXEL_SCALE_TAG, &[30.0, 30.0, 0.0]));
        assert_eq!(written[1].count, 6);
    }

    #[test]
    fn rotated_transform_uses_matrix() {
        let written = geo_transform_tags(&GeoTransform([10.0, 1.0, 0.5, 20.0, 0.25, -1.0]));
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].tag, tags::MODEL_TRANSFORMATION_TAG);
        assert_eq!(written[0].count, 16);
    }

    #[test]
    fn empty_projection_writes_nothing() {
        assert!(projection_tags(&Projection::default()).is_empty());
    }
}
