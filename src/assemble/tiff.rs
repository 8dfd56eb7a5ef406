//! Streaming BigTIFF writer with JPEG-compressed tiles and an image pyramid
//!
//! vips-style pyramidal output: one BigTIFF container holding the full
//! mosaic plus successively halved resolution levels, each stored as
//! 256x256 JPEG-compressed tiles so viewers can pan and zoom without
//! decoding the whole image. No crate in the ecosystem encodes this
//! combination (the `tiff` crate writes stripped images only), so the
//! container is emitted directly; tile payloads are compressed with the
//! `image` crate's JPEG encoder.
//!
//! The writer is incremental: callers feed full rows of the base image in
//! order, and each completed 256-row band is compressed, written, and
//! box-downsampled into the next level. The full canvas never exists in
//! memory.

use crate::io::configuration::TIFF_TILE_SIZE;
use crate::io::error::{MosaicError, Result, computation_error, invalid_parameter};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

// BigTIFF field type codes
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_LONG8: u16 = 16;

// Entries per IFD; fixed layout, tags in ascending order
const IFD_ENTRY_COUNT: u64 = 12;
const IFD_SIZE: u64 = 8 + IFD_ENTRY_COUNT * 20 + 8;

/// One pyramid level under construction
struct Level {
    width: u32,
    height: u32,
    /// Pending band of up to `TIFF_TILE_SIZE` rows at this level
    band: Vec<u8>,
    rows_in_band: u32,
    tile_offsets: Vec<u64>,
    tile_byte_counts: Vec<u64>,
}

impl Level {
    fn new(width: u32, height: u32) -> Self {
        let tiles_across = width.div_ceil(TIFF_TILE_SIZE) as usize;
        let tiles_down = height.div_ceil(TIFF_TILE_SIZE) as usize;
        Self {
            width,
            height,
            band: vec![0; TIFF_TILE_SIZE as usize * width as usize * 3],
            rows_in_band: 0,
            tile_offsets: Vec::with_capacity(tiles_across * tiles_down),
            tile_byte_counts: Vec::with_capacity(tiles_across * tiles_down),
        }
    }
}

/// Incremental writer for a pyramidal, tiled, JPEG-compressed BigTIFF
///
/// Rows of the base image are accepted strictly top to bottom via
/// [`write_rows`](Self::write_rows); [`finish`](Self::finish) flushes the
/// partial bottom bands of every level and writes the IFD chain.
pub struct PyramidTiffWriter {
    file: BufWriter<File>,
    path: PathBuf,
    quality: u8,
    /// Current append position in the output file
    pos: u64,
    levels: Vec<Level>,
    /// Base-image rows received so far
    rows_written: u64,
}

impl PyramidTiffWriter {
    /// Create the output file and write the BigTIFF header
    ///
    /// Pyramid levels halve (ceiling division) until a level fits inside
    /// a single internal tile.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the file cannot be
    /// created and written.
    pub fn create(path: &Path, width: u32, height: u32, quality: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(invalid_parameter(
                "mosaic dimensions",
                &format!("{width}x{height}"),
                &"output image must be non-empty",
            ));
        }

        let mut dims = vec![(width, height)];
        while let Some(&(w, h)) = dims.last() {
            if w <= TIFF_TILE_SIZE && h <= TIFF_TILE_SIZE {
                break;
            }
            dims.push((w.div_ceil(2), h.div_ceil(2)));
        }
        let levels = dims.into_iter().map(|(w, h)| Level::new(w, h)).collect();

        let file = File::create(path).map_err(|e| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "create output image",
            source: e,
        })?;

        let mut writer = Self {
            file: BufWriter::new(file),
            path: path.to_path_buf(),
            quality,
            pos: 0,
            levels,
            rows_written: 0,
        };

        // BigTIFF header: little-endian, version 43, 8-byte offsets; the
        // first-IFD offset at byte 8 is patched in finish()
        let mut header = [0u8; 16];
        header[0] = b'I';
        header[1] = b'I';
        header[2..4].copy_from_slice(&43u16.to_le_bytes());
        header[4..6].copy_from_slice(&8u16.to_le_bytes());
        writer.write_bytes(&header)?;

        Ok(writer)
    }

    /// Append one or more complete rows of the base image
    ///
    /// `rows` must hold a whole number of `width * 3` RGB rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte length is not row-aligned, more rows
    /// arrive than the image height, or writing/encoding fails.
    pub fn write_rows(&mut self, rows: &[u8]) -> Result<()> {
        let level = self.levels.first().ok_or_else(|| {
            computation_error("tiff write", &"writer has no pyramid levels")
        })?;
        let stride = level.width as usize * 3;
        if rows.len() % stride != 0 {
            return Err(computation_error(
                "tiff write",
                &format!("row data length {} is not a multiple of {stride}", rows.len()),
            ));
        }
        let count = (rows.len() / stride) as u64;
        if self.rows_written + count > u64::from(level.height) {
            return Err(computation_error(
                "tiff write",
                &format!("received more than {} rows", level.height),
            ));
        }
        self.rows_written += count;
        self.push_rows(0, rows)
    }

    /// Flush partial bands, write the IFD chain, and patch the header
    ///
    /// # Errors
    ///
    /// Returns an error if fewer rows were written than the image height
    /// or any file operation fails.
    pub fn finish(mut self) -> Result<()> {
        let base_height = self.levels.first().map_or(0, |l| u64::from(l.height));
        if self.rows_written != base_height {
            return Err(computation_error(
                "tiff finish",
                &format!(
                    "received {} of {base_height} rows",
                    self.rows_written
                ),
            ));
        }

        // Flush bottom partial bands top-down; flushing level N feeds its
        // remaining rows into level N+1 before that level is flushed
        for level in 0..self.levels.len() {
            self.flush_band(level)?;
        }

        let levels = std::mem::take(&mut self.levels);

        // Tile arrays too large for an inline IFD value come first
        let mut array_positions: Vec<(u64, u64)> = Vec::with_capacity(levels.len());
        for level in &levels {
            let offsets_pos = self.pos;
            if level.tile_offsets.len() > 1 {
                self.write_u64_array(&level.tile_offsets)?;
            }
            let counts_pos = self.pos;
            if level.tile_byte_counts.len() > 1 {
                self.write_u64_array(&level.tile_byte_counts)?;
            }
            array_positions.push((offsets_pos, counts_pos));
        }

        let first_ifd = self.pos;
        for (index, level) in levels.iter().enumerate() {
            let (offsets_pos, counts_pos) = array_positions[index];
            let next_ifd = if index + 1 == levels.len() {
                0
            } else {
                first_ifd + (index as u64 + 1) * IFD_SIZE
            };
            let ifd = Self::encode_ifd(level, index, offsets_pos, counts_pos, next_ifd);
            self.write_bytes(&ifd)?;
        }

        self.file
            .seek(SeekFrom::Start(8))
            .map_err(|e| self.fs_err("seek in output image", e))?;
        self.file
            .write_all(&first_ifd.to_le_bytes())
            .map_err(|e| self.fs_err("write output image", e))?;
        self.file
            .flush()
            .map_err(|e| self.fs_err("flush output image", e))?;
        Ok(())
    }

    fn push_rows(&mut self, level_index: usize, rows: &[u8]) -> Result<()> {
        let stride = match self.levels.get(level_index) {
            Some(level) => level.width as usize * 3,
            None => return Ok(()),
        };
        for chunk in rows.chunks_exact(stride) {
            if let Some(level) = self.levels.get_mut(level_index) {
                let offset = level.rows_in_band as usize * stride;
                level.band[offset..offset + stride].copy_from_slice(chunk);
                level.rows_in_band += 1;
                if level.rows_in_band == TIFF_TILE_SIZE {
                    self.flush_band(level_index)?;
                }
            }
        }
        Ok(())
    }

    /// Compress and write the pending band of one level, then feed its
    /// downsampled rows into the next level
    fn flush_band(&mut self, level_index: usize) -> Result<()> {
        let (rows_in_band, width) = match self.levels.get(level_index) {
            Some(level) if level.rows_in_band > 0 => (level.rows_in_band, level.width),
            _ => return Ok(()),
        };
        let band = std::mem::take(&mut self.levels[level_index].band);
        self.levels[level_index].rows_in_band = 0;

        for tile_col in 0..width.div_ceil(TIFF_TILE_SIZE) {
            let payload = Self::encode_tile(&band, width, rows_in_band, tile_col, self.quality)
                .map_err(|e| MosaicError::ImageExport {
                    path: self.path.clone(),
                    source: e,
                })?;
            self.write_payload(level_index, &payload)?;
        }

        if level_index + 1 < self.levels.len() {
            let stride = width as usize * 3;
            let reduced = downsample_rows(&band[..rows_in_band as usize * stride], width);
            self.levels[level_index].band = band;
            self.push_rows(level_index + 1, &reduced)?;
        } else {
            self.levels[level_index].band = band;
        }
        Ok(())
    }

    /// JPEG-compress one 256x256 tile cut from a band, zero-padding past
    /// the right and bottom image edges
    fn encode_tile(
        band: &[u8],
        width: u32,
        rows_in_band: u32,
        tile_col: u32,
        quality: u8,
    ) -> image::ImageResult<Vec<u8>> {
        let tile = TIFF_TILE_SIZE as usize;
        let stride = width as usize * 3;
        let x0 = (tile_col * TIFF_TILE_SIZE) as usize;
        let cols = (width as usize - x0).min(tile);

        let mut pixels = vec![0u8; tile * tile * 3];
        for y in 0..rows_in_band as usize {
            let src = y * stride + x0 * 3;
            let dst = y * tile * 3;
            pixels[dst..dst + cols * 3].copy_from_slice(&band[src..src + cols * 3]);
        }

        let mut payload = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut payload, quality);
        encoder.write_image(
            &pixels,
            TIFF_TILE_SIZE,
            TIFF_TILE_SIZE,
            ExtendedColorType::Rgb8,
        )?;
        Ok(payload)
    }

    fn write_payload(&mut self, level_index: usize, payload: &[u8]) -> Result<()> {
        let offset = self.pos;
        self.write_bytes(payload)?;
        // Keep offsets word-aligned for readers that expect it
        if self.pos % 2 == 1 {
            self.write_bytes(&[0])?;
        }
        if let Some(level) = self.levels.get_mut(level_index) {
            level.tile_offsets.push(offset);
            level.tile_byte_counts.push(payload.len() as u64);
        }
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.file
            .write_all(bytes)
            .map_err(|e| self.fs_err("write output image", e))?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    fn write_u64_array(&mut self, values: &[u64]) -> Result<()> {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for value in values {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        self.write_bytes(&bytes)
    }

    fn fs_err(&self, operation: &'static str, source: std::io::Error) -> MosaicError {
        MosaicError::FileSystem {
            path: self.path.clone(),
            operation,
            source,
        }
    }

    fn encode_ifd(
        level: &Level,
        level_index: usize,
        offsets_pos: u64,
        counts_pos: u64,
        next_ifd: u64,
    ) -> Vec<u8> {
        let tile_count = level.tile_offsets.len() as u64;
        let mut ifd = Vec::with_capacity(IFD_SIZE as usize);
        ifd.extend_from_slice(&IFD_ENTRY_COUNT.to_le_bytes());

        let subfile_type = u32::from(level_index > 0); // 1 = reduced-resolution
        push_entry(&mut ifd, 254, TYPE_LONG, 1, inline_long(subfile_type));
        push_entry(&mut ifd, 256, TYPE_LONG, 1, inline_long(level.width));
        push_entry(&mut ifd, 257, TYPE_LONG, 1, inline_long(level.height));
        push_entry(&mut ifd, 258, TYPE_SHORT, 3, inline_shorts(&[8, 8, 8]));
        push_entry(&mut ifd, 259, TYPE_SHORT, 1, inline_shorts(&[7])); // JPEG
        push_entry(&mut ifd, 262, TYPE_SHORT, 1, inline_shorts(&[6])); // YCbCr
        push_entry(&mut ifd, 277, TYPE_SHORT, 1, inline_shorts(&[3]));
        push_entry(&mut ifd, 284, TYPE_SHORT, 1, inline_shorts(&[1]));
        push_entry(&mut ifd, 322, TYPE_LONG, 1, inline_long(TIFF_TILE_SIZE));
        push_entry(&mut ifd, 323, TYPE_LONG, 1, inline_long(TIFF_TILE_SIZE));

        // Single-tile arrays fit in the inline value field
        let offsets_value = if tile_count == 1 {
            level.tile_offsets.first().copied().unwrap_or(0).to_le_bytes()
        } else {
            offsets_pos.to_le_bytes()
        };
        push_entry(&mut ifd, 324, TYPE_LONG8, tile_count, offsets_value);
        let counts_value = if tile_count == 1 {
            level
                .tile_byte_counts
                .first()
                .copied()
                .unwrap_or(0)
                .to_le_bytes()
        } else {
            counts_pos.to_le_bytes()
        };
        push_entry(&mut ifd, 325, TYPE_LONG8, tile_count, counts_value);

        ifd.extend_from_slice(&next_ifd.to_le_bytes());
        ifd
    }
}

fn push_entry(ifd: &mut Vec<u8>, tag: u16, field_type: u16, count: u64, value: [u8; 8]) {
    ifd.extend_from_slice(&tag.to_le_bytes());
    ifd.extend_from_slice(&field_type.to_le_bytes());
    ifd.extend_from_slice(&count.to_le_bytes());
    ifd.extend_from_slice(&value);
}

fn inline_long(value: u32) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&value.to_le_bytes());
    out
}

fn inline_shorts(values: &[u16]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (slot, value) in out.chunks_exact_mut(2).zip(values.iter()) {
        slot.copy_from_slice(&value.to_le_bytes());
    }
    out
}

/// Downsample a band of rows by 2 in each dimension with a 2x2 box filter
///
/// Output is `ceil(rows / 2)` rows of `ceil(width / 2)` pixels; the last
/// row and column are reused when a dimension is odd. Sums round to
/// nearest.
pub(crate) fn downsample_rows(rows: &[u8], width: u32) -> Vec<u8> {
    let w = width as usize;
    let stride = w * 3;
    let n = if stride == 0 { 0 } else { rows.len() / stride };
    let out_w = w.div_ceil(2);
    let out_h = n.div_ceil(2);

    let mut out = Vec::with_capacity(out_w * out_h * 3);
    for y in 0..out_h {
        let y0 = 2 * y;
        let y1 = (2 * y + 1).min(n.saturating_sub(1));
        for x in 0..out_w {
            let x0 = 2 * x;
            let x1 = (2 * x + 1).min(w - 1);
            for c in 0..3 {
                let sum = u16::from(rows[y0 * stride + x0 * 3 + c])
                    + u16::from(rows[y0 * stride + x1 * 3 + c])
                    + u16::from(rows[y1 * stride + x0 * 3 + c])
                    + u16::from(rows[y1 * stride + x1 * 3 + c]);
                out.push(((sum + 2) / 4) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsample_averages_2x2_blocks() {
        // 2x2 single-channel-per-pixel pattern: averages to one pixel
        let rows = [
            10, 0, 0, 20, 0, 0, //
            30, 0, 0, 40, 0, 0,
        ];
        let out = downsample_rows(&rows, 2);
        assert_eq!(out, vec![25, 0, 0]);
    }

    #[test]
    fn test_downsample_reuses_edge_row_and_column_when_odd() {
        // 3x1: last column pairs with itself, single row with itself
        let rows = [0, 0, 0, 100, 100, 100, 200, 200, 200];
        let out = downsample_rows(&rows, 3);
        assert_eq!(out.len(), 2 * 3);
        assert_eq!(out[..3], [50, 50, 50]);
        assert_eq!(out[3..], [200, 200, 200]);
    }

    #[test]
    fn test_downsample_rounds_to_nearest() {
        let rows = [0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1];
        // Sum 3 over 4 samples = 0.75, rounds to 1
        let out = downsample_rows(&rows, 2);
        assert_eq!(out, vec![1, 1, 1]);
    }

    #[test]
    fn test_empty_band_downsamples_to_empty() {
        assert!(downsample_rows(&[], 4).is_empty());
    }
}
