//! Rendering of one mosaic row into a persisted strip image

use crate::catalog::TileCatalog;
use crate::io::error::{MosaicError, Result};
use crate::io::progress::diagnostic;
use crate::render::remap::remap_tile;
use image::{RgbImage, imageops};
use indicatif::ProgressBar;
use ndarray::ArrayView2;
use rand::Rng;
use std::path::Path;

/// Center-crop a tile that exceeds the cell size in either dimension
///
/// Tiles are normally pre-normalized to `tile_size`; arbitrary sizes are
/// handled by cropping per use. A tile smaller than the cell is placed
/// as-is, leaving the remainder of the cell black.
fn fit_tile(tile: RgbImage, tile_size: u32) -> RgbImage {
    let (width, height) = tile.dimensions();
    if width <= tile_size && height <= tile_size {
        return tile;
    }
    let crop_w = width.min(tile_size);
    let crop_h = height.min(tile_size);
    let x = (width - crop_w) / 2;
    let y = (height - crop_h) / 2;
    imageops::crop_imm(&tile, x, y, crop_w, crop_h).to_image()
}

/// Render one mosaic row and persist it as a strip image
///
/// For each of the row's cells, one tile is drawn uniformly at random from
/// the catalog, decoded from disk, color-shifted toward the cell's target
/// color, and placed at horizontal offset `cell * tile_size` in a
/// `(W * tile_size) x tile_size` canvas. A tile that fails to decode
/// costs only its own cell (left black, logged); the row continues.
///
/// # Errors
///
/// Returns an error if the catalog is empty or the finished strip cannot
/// be written to `dest`.
pub fn render_row(
    row_colors: ArrayView2<'_, u8>,
    dest: &Path,
    catalog: &TileCatalog,
    tiles_dir: &Path,
    tile_size: u32,
    rng: &mut impl Rng,
    progress: Option<&ProgressBar>,
) -> Result<()> {
    let cells = row_colors.nrows();
    let mut canvas = RgbImage::new(cells as u32 * tile_size, tile_size);

    for cell in 0..cells {
        let target = [
            row_colors[[cell, 0]],
            row_colors[[cell, 1]],
            row_colors[[cell, 2]],
        ];
        let entry = catalog.pick(tiles_dir, rng)?;
        let tile_file = tiles_dir.join(&entry.name);

        // Contain per-tile failures: a bad tile never loses the whole row
        let tile = match crate::io::image::decode_tile(&tile_file) {
            Ok(Some(tile)) => tile,
            Ok(None) => {
                diagnostic(
                    progress,
                    &format!("{}: no longer a 3-channel image, cell left black", entry.name),
                );
                continue;
            }
            Err(e) => {
                diagnostic(progress, &format!("{e}, cell left black"));
                continue;
            }
        };

        let tile = fit_tile(tile, tile_size);
        let recolored = remap_tile(&tile, entry.color, target);
        imageops::replace(
            &mut canvas,
            &recolored,
            i64::from(cell as u32 * tile_size),
            0,
        );
    }

    canvas.save(dest).map_err(|e| MosaicError::ImageExport {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_fit_tile_passes_through_at_or_under_size() {
        let tile = RgbImage::from_pixel(4, 3, Rgb([1, 2, 3]));
        let fitted = fit_tile(tile.clone(), 4);
        assert_eq!(fitted, tile);
    }

    #[test]
    fn test_fit_tile_center_crops_oversized() {
        // 6x2 tile with distinct columns; a width-2 crop keeps columns 2..4
        let mut tile = RgbImage::new(6, 2);
        for x in 0..6u32 {
            for y in 0..2u32 {
                tile.put_pixel(x, y, Rgb([x as u8 * 10, 0, 0]));
            }
        }
        let fitted = fit_tile(tile, 2);
        assert_eq!(fitted.dimensions(), (2, 2));
        assert_eq!(fitted.get_pixel(0, 0).0, [20, 0, 0]);
        assert_eq!(fitted.get_pixel(1, 0).0, [30, 0, 0]);
    }
}
