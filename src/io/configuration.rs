//! Pipeline constants and runtime configuration defaults

// Output encoding settings, matching the viewable-without-full-decode
// contract: tiled, pyramidal, lossy, 64-bit offsets
/// JPEG quality factor for compressed mosaic tiles
pub const JPEG_QUALITY: u8 = 20;
/// Side length in pixels of the internal TIFF tiles
pub const TIFF_TILE_SIZE: u32 = 256;

// Intermediate row strips
/// File extension used for persisted row strips
pub const STRIP_EXTENSION: &str = "png";
/// Default directory for persisted row strips
pub const DEFAULT_STRIP_DIR: &str = "tmp";

// Default values for configurable parameters
/// Fixed seed for reproducible tile selection
pub const DEFAULT_SEED: u64 = 42;
