//! Phase-based progress display for the scan, render, and assembly stages

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

static PHASE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix:>12} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{prefix:>12} {spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Coordinates progress display across the sequential pipeline phases
///
/// Each phase (catalog scan, row rendering, assembly) gets its own bar so
/// completed phases remain visible while the next one runs. Diagnostic
/// lines are printed through the active bar to avoid tearing the display.
pub struct ProgressManager {
    multi_progress: MultiProgress,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
        }
    }

    /// Start a counted phase bar with the given label and length
    pub fn phase(&self, label: &'static str, len: u64) -> ProgressBar {
        let bar = self.multi_progress.add(ProgressBar::new(len));
        bar.set_style(PHASE_STYLE.clone());
        bar.set_prefix(label);
        bar
    }

    /// Start an uncounted spinner phase with the given label
    pub fn spinner(&self, label: &'static str) -> ProgressBar {
        let bar = self.multi_progress.add(ProgressBar::new_spinner());
        bar.set_style(SPINNER_STYLE.clone());
        bar.set_prefix(label);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        let _ = self.multi_progress.clear();
    }
}

/// Print a diagnostic line without tearing an active progress bar
///
/// Falls back to standard error when no bar is displayed.
// Allow print for diagnostics in quiet mode where no bar exists
#[allow(clippy::print_stderr)]
pub fn diagnostic(bar: Option<&ProgressBar>, message: &str) {
    match bar {
        Some(bar) => bar.println(message),
        None => eprintln!("{message}"),
    }
}
