//! Log-based progress reporting

use tracing::info;

use super::ports::ProgressObserver;

/// Observer that logs every committed batch
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_start(&self, total_rows: u64) {
        info!(total_rows, "writing rows to destination");
    }

    fn on_batch_committed(&self, rows_committed: u64, total_rows: u64) {
        info!(rows_committed, total_rows, "batch committed");
    }

    fn on_finish(&self) {
        info!("all batches committed");
    }
}
