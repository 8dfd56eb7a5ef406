//! Photomosaic renderer: a target image rebuilt as a grid of small tile
//! images drawn at random from a catalog and color-shifted per cell
//!
//! The pipeline summarizes a tile directory into average colors, renders
//! each source row in parallel as a persisted strip image, and streams the
//! strips into one pyramidal, tiled, JPEG-compressed BigTIFF that can be
//! viewed and zoomed without loading it wholly into memory.

/// Streaming assembly of row strips into the final pyramidal output image
pub mod assemble;
/// Tile directory scanning and average-color summarization
pub mod catalog;
/// Input/output operations, CLI orchestration, and error handling
pub mod io;
/// Per-row mosaic rendering: tile selection, color remapping, scheduling
pub mod render;

pub use io::error::{MosaicError, Result};
