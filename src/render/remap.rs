//! Uniform additive color shift applied to a tile

use image::RgbImage;

/// Shift every pixel of `tile` so its average color becomes `target`
///
/// Computes `diff = target - average` in a signed 16-bit intermediate,
/// adds it to each channel of each pixel, and clamps to [0, 255]. The
/// shift is uniform across the tile, so texture and detail survive while
/// the tile's mean color matches the target exactly, up to clamping loss
/// at the extremes. Heavy clamping silently degrades fidelity; that is
/// accepted behavior, not an error.
pub fn remap_tile(tile: &RgbImage, average: [u8; 3], target: [u8; 3]) -> RgbImage {
    let diff = [
        i16::from(target[0]) - i16::from(average[0]),
        i16::from(target[1]) - i16::from(average[1]),
        i16::from(target[2]) - i16::from(average[2]),
    ];

    let mut shifted = tile.clone();
    for pixel in shifted.pixels_mut() {
        for (sample, delta) in pixel.0.iter_mut().zip(diff.iter()) {
            *sample = (i16::from(*sample) + delta).clamp(0, 255) as u8;
        }
    }
    shifted
}
