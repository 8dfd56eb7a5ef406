//! Shared helpers for integration tests: tiny image fixtures and a
//! minimal BigTIFF structure reader used to verify assembled output

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::Path;

/// Write a constant-color RGB PNG fixture
pub(crate) fn write_rgb_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    img.save(path).expect("fixture save");
}

fn u16le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn u64le(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// One parsed IFD entry: field type, count, and the raw value word
/// (an inline value when it fits, otherwise an offset)
pub(crate) struct IfdEntry {
    pub(crate) field_type: u16,
    pub(crate) count: u64,
    pub(crate) value: u64,
}

/// Parse the IFD chain of a little-endian BigTIFF file
pub(crate) fn read_ifds(bytes: &[u8]) -> Vec<HashMap<u16, IfdEntry>> {
    assert_eq!(&bytes[0..2], b"II", "not little-endian TIFF");
    assert_eq!(u16le(bytes, 2), 43, "not a BigTIFF file");
    assert_eq!(u16le(bytes, 4), 8, "unexpected offset size");

    let mut ifds = Vec::new();
    let mut offset = u64le(bytes, 8) as usize;
    while offset != 0 {
        let entry_count = u64le(bytes, offset) as usize;
        let mut entries = HashMap::new();
        for index in 0..entry_count {
            let at = offset + 8 + index * 20;
            let tag = u16le(bytes, at);
            let field_type = u16le(bytes, at + 2);
            let count = u64le(bytes, at + 4);
            let value = match (field_type, count) {
                (3, 1) => u64::from(u16le(bytes, at + 12)),
                (4, 1) => u64::from(u32le(bytes, at + 12)),
                _ => u64le(bytes, at + 12),
            };
            entries.insert(
                tag,
                IfdEntry {
                    field_type,
                    count,
                    value,
                },
            );
        }
        ifds.push(entries);
        offset = u64le(bytes, offset + 8 + entry_count * 20) as usize;
    }
    ifds
}

/// Read a LONG8 array entry, following the offset when not inline
pub(crate) fn read_u64_array(bytes: &[u8], entry: &IfdEntry) -> Vec<u64> {
    assert_eq!(entry.field_type, 16, "expected a LONG8 entry");
    if entry.count == 1 {
        return vec![entry.value];
    }
    (0..entry.count as usize)
        .map(|i| u64le(bytes, entry.value as usize + i * 8))
        .collect()
}

/// Decode one JPEG tile payload back into pixels
pub(crate) fn decode_tile_payload(bytes: &[u8], offset: u64, length: u64) -> RgbImage {
    let payload = &bytes[offset as usize..(offset + length) as usize];
    image::load_from_memory(payload)
        .expect("tile payload decode")
        .to_rgb8()
}
