//! Command-line interface and end-to-end mosaic job orchestration

use crate::assemble::assemble;
use crate::catalog::TileCatalog;
use crate::io::configuration::{DEFAULT_SEED, DEFAULT_STRIP_DIR};
use crate::io::error::{MosaicError, Result};
use crate::io::progress::ProgressManager;
use crate::render::{scheduler::render_rows, strip_path};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(
    author,
    version,
    about = "Render a photomosaic from a directory of tile images"
)]
/// Command-line arguments for the mosaic renderer
pub struct Cli {
    /// Source image to rebuild as a mosaic
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output path for the pyramidal TIFF mosaic
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Directory of candidate tile images (non-RGB images are ignored)
    #[arg(value_name = "TILES_DIR")]
    pub tiles_dir: PathBuf,

    /// Side length in pixels of each rendered mosaic cell
    #[arg(value_name = "TILE_SIZE", value_parser = clap::value_parser!(u32).range(1..))]
    pub tile_size: u32,

    /// Maximum rows rendered in parallel per batch
    #[arg(value_name = "MAX_WORKERS", value_parser = clap::value_parser!(u16).range(1..))]
    pub max_workers: u16,

    /// Random seed for reproducible tile selection
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Directory for intermediate row strips
    #[arg(long, default_value = DEFAULT_STRIP_DIR)]
    pub strip_dir: PathBuf,

    /// Keep intermediate row strips after assembly
    #[arg(short, long)]
    pub keep_strips: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Runs the whole pipeline: catalog, row rendering, assembly, cleanup
pub struct MosaicJob {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl MosaicJob {
    /// Create a new job from parsed CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Run the pipeline to completion
    ///
    /// Phases run strictly in order: the catalog is built once, every row
    /// batch completes before assembly starts, and consumed strips are
    /// removed afterwards unless `--keep-strips` was given.
    ///
    /// # Errors
    ///
    /// Returns the first error from any phase; later phases are not run.
    pub fn run(&self) -> Result<()> {
        let load_spinner = self
            .progress_manager
            .as_ref()
            .map(|pm| pm.spinner("load source"));
        let source = crate::io::image::load_source(&self.cli.source)?;
        let (height, width, _) = source.dim();
        if let Some(bar) = &load_spinner {
            bar.finish_with_message(format!("{width}x{height} cells"));
        }

        let scan_bar = self
            .progress_manager
            .as_ref()
            .map(|pm| pm.phase("tile colors", 0));
        let catalog = TileCatalog::build(&self.cli.tiles_dir, scan_bar.as_ref())?;
        if let Some(bar) = &scan_bar {
            bar.finish_with_message(format!("{} tiles admitted", catalog.len()));
        }

        std::fs::create_dir_all(&self.cli.strip_dir).map_err(|e| MosaicError::FileSystem {
            path: self.cli.strip_dir.clone(),
            operation: "create strip directory",
            source: e,
        })?;

        let row_bar = self
            .progress_manager
            .as_ref()
            .map(|pm| pm.phase("render rows", height as u64));
        render_rows(
            &source,
            &self.cli.strip_dir,
            &catalog,
            &self.cli.tiles_dir,
            self.cli.tile_size,
            usize::from(self.cli.max_workers),
            self.cli.seed,
            row_bar.as_ref(),
        )?;
        if let Some(bar) = &row_bar {
            bar.finish_with_message("done");
        }

        let assemble_bar = self
            .progress_manager
            .as_ref()
            .map(|pm| pm.phase("assemble", height as u64));
        assemble(
            (height, width),
            &self.cli.dest,
            &self.cli.strip_dir,
            self.cli.tile_size,
            assemble_bar.as_ref(),
        )?;
        if let Some(bar) = &assemble_bar {
            bar.finish_with_message(format!("{}", self.cli.dest.display()));
        }

        if !self.cli.keep_strips {
            // Strips were consumed exactly once; failures here are not fatal
            for row in 0..height {
                let _ = std::fs::remove_file(strip_path(&self.cli.strip_dir, row));
            }
        }

        if let Some(pm) = &self.progress_manager {
            pm.finish();
        }

        Ok(())
    }
}
