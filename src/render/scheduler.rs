//! Batch-synchronized parallel dispatch of row renders

use crate::catalog::TileCatalog;
use crate::io::error::{MosaicError, Result, computation_error, invalid_parameter};
use crate::render::{row::render_row, strip_path};
use indicatif::ProgressBar;
use ndarray::{Array3, s};
use rand::{SeedableRng, rngs::StdRng};
use std::path::Path;

/// Render every source row to a persisted strip, at most `max_workers`
/// rows in flight at a time
///
/// Rows are partitioned into sequential batches of `max_workers`; each
/// batch runs on scoped threads and the scheduler waits for the whole
/// batch before starting the next, bounding peak resource use with a full
/// barrier between batches. Each row index is dispatched exactly once, so
/// every strip file has a single writer. Completion order within a batch
/// is unconstrained; only the strip files on disk are observed.
///
/// Each row derives its own RNG from the run seed and row index, so strip
/// content does not depend on thread interleaving or `max_workers`.
///
/// # Errors
///
/// Returns an error if `max_workers` is zero, the catalog is empty, or
/// any row render fails. A failing row is reported only after its whole
/// batch has been joined; later batches are not started.
pub fn render_rows(
    source: &Array3<u8>,
    strip_dir: &Path,
    catalog: &TileCatalog,
    tiles_dir: &Path,
    tile_size: u32,
    max_workers: usize,
    seed: u64,
    progress: Option<&ProgressBar>,
) -> Result<()> {
    if max_workers == 0 {
        return Err(invalid_parameter(
            "max_workers",
            &max_workers,
            &"must be at least one",
        ));
    }
    if catalog.is_empty() {
        return Err(MosaicError::EmptyCatalog {
            path: tiles_dir.to_path_buf(),
        });
    }

    let height = source.dim().0;
    let rows: Vec<usize> = (0..height).collect();

    for batch in rows.chunks(max_workers) {
        let mut batch_result: Result<()> = Ok(());

        std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|&row| {
                    let bar = progress.cloned();
                    scope.spawn(move || -> Result<()> {
                        let colors = source.slice(s![row, .., ..]);
                        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(row as u64));
                        let dest = strip_path(strip_dir, row);
                        render_row(
                            colors,
                            &dest,
                            catalog,
                            tiles_dir,
                            tile_size,
                            &mut rng,
                            bar.as_ref(),
                        )?;
                        if let Some(bar) = &bar {
                            bar.inc(1);
                        }
                        Ok(())
                    })
                })
                .collect();

            // Full barrier: join every worker before surfacing an error
            for handle in handles {
                let joined = handle.join().unwrap_or_else(|_| {
                    Err(computation_error("row render", &"worker thread panicked"))
                });
                if let Err(e) = joined {
                    if batch_result.is_ok() {
                        batch_result = Err(e);
                    }
                }
            }
        });

        batch_result?;
    }

    Ok(())
}
