//! Image decoding for the mosaic source and candidate tiles

use crate::io::error::{MosaicError, Result, computation_error};
use image::RgbImage;
use ndarray::Array3;
use std::path::Path;

/// Load the mosaic source image as a (height, width, 3) array of RGB samples
///
/// The source is decoded once and converted to 8-bit RGB regardless of its
/// stored format; rows of the returned array are later sliced as read-only
/// views and handed to the row workers.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded as an image.
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<Array3<u8>> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| MosaicError::ImageLoad {
        path: path_buf,
        source: e,
    })?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    // RgbImage raw storage is row-major RGB, matching (h, w, 3) layout
    Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())
        .map_err(|e| computation_error("source image reshape", &e))
}

/// Decode a candidate tile, admitting only images stored with exactly
/// three color channels and no alpha
///
/// Returns `Ok(None)` for decodable images that fail the channel check
/// (grayscale, RGBA, ...), mirroring the catalog admission invariant.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded at all.
pub fn decode_tile<P: AsRef<Path>>(path: P) -> Result<Option<RgbImage>> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| MosaicError::ImageLoad {
        path: path_buf,
        source: e,
    })?;

    let color = img.color();
    if color.channel_count() != 3 || color.has_alpha() {
        return Ok(None);
    }

    Ok(Some(img.to_rgb8()))
}
