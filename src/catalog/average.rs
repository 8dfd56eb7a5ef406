//! Per-channel mean color of an RGB image buffer

use image::RgbImage;

/// Compute the per-channel mean color of an RGB image
///
/// Sums are accumulated in 64 bits per channel, so the result cannot
/// overflow for any image the `image` crate can decode. Each channel mean
/// is rounded to the nearest integer; the result always lies in [0, 255].
/// An empty image averages to black.
pub fn average_color(image: &RgbImage) -> [u8; 3] {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return [0, 0, 0];
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, &sample) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += u64::from(sample);
        }
    }

    let mut avg = [0u8; 3];
    for (out, sum) in avg.iter_mut().zip(sums.iter()) {
        *out = ((*sum as f64) / (pixel_count as f64)).round() as u8;
    }
    avg
}
