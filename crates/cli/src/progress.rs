//! Terminal progress bar for committed write batches

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rostersync_core::ProgressObserver;

const TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})";

/// Progress bar fed by the writer after each committed batch
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("█▓▒░"));
        }
        bar.set_message("Writing");
        Self { bar }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&self, total_rows: u64) {
        self.bar.set_length(total_rows);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn on_batch_committed(&self, rows_committed: u64, _total_rows: u64) {
        self.bar.set_position(rows_committed);
    }

    fn on_finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_committed_rows() {
        let progress = BarProgress::hidden();

        progress.on_start(2500);
        progress.on_batch_committed(1000, 2500);
        progress.on_batch_committed(2000, 2500);

        assert_eq!(progress.bar.length(), Some(2500));
        assert_eq!(progress.bar.position(), 2000);

        progress.on_batch_committed(2500, 2500);
        progress.on_finish();
        assert!(progress.bar.is_finished());
    }
}
