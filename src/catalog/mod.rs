//! Tile catalog: candidate tile images summarized by average color
//!
//! The catalog is built once per run and is read-only shared state for the
//! rendering phase. Entries are kept in a filename-sorted sequence so the
//! uniform random pick is well-defined and reproducible under a seeded
//! generator, independent of directory iteration order.

/// Per-channel mean color computation
pub mod average;

use crate::io::error::{MosaicError, Result};
use crate::io::progress::diagnostic;
use indicatif::ProgressBar;
use rand::Rng;
use std::path::Path;

/// One admitted tile: its filename and precomputed average color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEntry {
    /// Filename of the tile within the tile directory
    pub name: String,
    /// Precomputed per-channel mean color
    pub color: [u8; 3],
}

/// Immutable catalog of admissible tiles and their average colors
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    entries: Vec<TileEntry>,
}

impl TileCatalog {
    /// Scan a tile directory (non-recursive) and summarize each admissible
    /// image by its average color
    ///
    /// Files that fail to decode or decode to anything other than a
    /// plain three-channel image are skipped with a diagnostic line, never
    /// aborting the scan. Construction fails only if the directory itself
    /// cannot be listed. An empty result is valid; emptiness is rejected
    /// later, when a tile is actually requested.
    ///
    /// # Errors
    ///
    /// Returns an error if `tiles_dir` cannot be read.
    pub fn build(tiles_dir: &Path, progress: Option<&ProgressBar>) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let dir = std::fs::read_dir(tiles_dir).map_err(|e| MosaicError::FileSystem {
            path: tiles_dir.to_path_buf(),
            operation: "list tile directory",
            source: e,
        })?;
        for entry in dir {
            let entry = entry.map_err(|e| MosaicError::FileSystem {
                path: tiles_dir.to_path_buf(),
                operation: "list tile directory",
                source: e,
            })?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // Sorted scan keeps entry indices stable across runs
        names.sort_unstable();

        if let Some(bar) = progress {
            bar.set_length(names.len() as u64);
        }

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let path = tiles_dir.join(&name);
            match crate::io::image::decode_tile(&path) {
                Ok(Some(tile)) => {
                    entries.push(TileEntry {
                        color: average::average_color(&tile),
                        name,
                    });
                }
                Ok(None) => {
                    diagnostic(progress, &format!("skipping {name}: not a 3-channel image"));
                }
                Err(e) => {
                    diagnostic(progress, &format!("skipping {name}: {e}"));
                }
            }
            if let Some(bar) = progress {
                bar.inc(1);
            }
        }

        Ok(Self { entries })
    }

    /// Number of admitted tiles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog admitted no tiles
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All admitted entries in filename order
    pub fn entries(&self) -> &[TileEntry] {
        &self.entries
    }

    /// Draw one tile uniformly at random from the whole catalog
    ///
    /// Tile content is deliberately unrelated to the target color; the
    /// mosaic's color accuracy comes entirely from the remap step.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::EmptyCatalog`] if no tiles were admitted.
    pub fn pick(&self, tiles_dir: &Path, rng: &mut impl Rng) -> Result<&TileEntry> {
        if self.entries.is_empty() {
            return Err(MosaicError::EmptyCatalog {
                path: tiles_dir.to_path_buf(),
            });
        }
        let index = rng.random_range(0..self.entries.len());
        self.entries
            .get(index)
            .ok_or_else(|| MosaicError::EmptyCatalog {
                path: tiles_dir.to_path_buf(),
            })
    }
}
