//! Row-parallel mosaic rendering
//!
//! This module contains the rendering phase of the pipeline:
//! - Uniform additive color remapping of tiles
//! - Per-row strip rendering with random tile selection
//! - Batch-synchronized dispatch across a bounded set of workers

/// Uniform additive color shift applied to tiles
pub mod remap;
/// Rendering of one mosaic row to a persisted strip
pub mod row;
/// Batch-synchronized parallel row dispatch
pub mod scheduler;

use std::path::{Path, PathBuf};

/// Path of the persisted strip image for one source row
pub fn strip_path(strip_dir: &Path, row: usize) -> PathBuf {
    strip_dir.join(format!(
        "{row}.{}",
        crate::io::configuration::STRIP_EXTENSION
    ))
}
