//! Streaming assembly of persisted row strips into the final mosaic
//!
//! The assembler is the single consumer of the strip directory: strips
//! are read strictly in increasing row order, exactly once each, and
//! streamed into the pyramidal TIFF writer band by band. It runs after
//! all rendering batches have completed; running it concurrently would
//! race on the strip files it depends on.

/// Streaming pyramidal BigTIFF writer
pub mod tiff;

use crate::io::configuration::JPEG_QUALITY;
use crate::io::error::{MosaicError, Result};
use crate::render::strip_path;
use indicatif::ProgressBar;
use std::path::Path;

use tiff::PyramidTiffWriter;

/// Assemble all row strips into one pyramidal mosaic image at `dest`
///
/// `source_dims` is the (height, width) of the source image in cells; the
/// output measures `(width * tile_size) x (height * tile_size)` pixels.
/// Each strip must exist in `strip_dir` and match the expected geometry.
///
/// # Errors
///
/// Returns an error if a strip is missing, undecodable, or mismatched,
/// or if the output image cannot be written.
pub fn assemble(
    source_dims: (usize, usize),
    dest: &Path,
    strip_dir: &Path,
    tile_size: u32,
    progress: Option<&ProgressBar>,
) -> Result<()> {
    let (height, width) = source_dims;
    let out_width = width as u32 * tile_size;
    let out_height = height as u32 * tile_size;

    let mut writer = PyramidTiffWriter::create(dest, out_width, out_height, JPEG_QUALITY)?;

    for row in 0..height {
        let path = strip_path(strip_dir, row);
        let strip = image::open(&path)
            .map_err(|e| MosaicError::ImageLoad {
                path: path.clone(),
                source: e,
            })?
            .to_rgb8();
        if strip.dimensions() != (out_width, tile_size) {
            return Err(MosaicError::StripMismatch {
                path,
                expected: (out_width, tile_size),
                actual: strip.dimensions(),
            });
        }
        writer.write_rows(strip.as_raw())?;
        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    writer.finish()
}
