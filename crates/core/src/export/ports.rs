//! Port interfaces for the destination sheet

use async_trait::async_trait;
use rostersync_domain::{Result, SheetMetadata, SheetRow};

/// Trait for a growable tabular destination
///
/// Implementations must report throttling as
/// `RosterSyncError::RateLimited` so the writer can tell it apart from
/// permanent failures.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Read the destination sheet's id, title and row capacity
    async fn sheet_metadata(&self) -> Result<SheetMetadata>;

    /// Grow the sheet by `count` rows
    async fn append_rows(&self, sheet: &SheetMetadata, count: u64) -> Result<()>;

    /// Number of rows currently holding values
    async fn existing_row_count(&self) -> Result<u64>;

    /// Write `rows` as a contiguous range whose first row is `start_row`
    /// (1-based)
    async fn write_rows(&self, start_row: u64, rows: &[SheetRow]) -> Result<()>;
}

/// Observer notified as the writer commits batches.
///
/// Purely a side channel; the writer never depends on it for correctness.
pub trait ProgressObserver: Send + Sync {
    /// Called once before the first batch with the number of data rows
    fn on_start(&self, _total_rows: u64) {}

    /// Called after each committed batch with the running total
    fn on_batch_committed(&self, rows_committed: u64, total_rows: u64);

    /// Called once after the last batch commits
    fn on_finish(&self) {}
}
