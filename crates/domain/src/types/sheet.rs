//! Destination sheet types and run summaries

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SHEET_HEADER;

/// One row of cell values, in destination column order.
pub type SheetRow = Vec<Value>;

/// Header row written at row 1 of an empty destination.
pub fn header_row() -> SheetRow {
    SHEET_HEADER.iter().map(|title| Value::from(*title)).collect()
}

/// Properties of the destination sheet that the writer depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMetadata {
    pub sheet_id: i64,
    pub title: String,
    /// Current grid row capacity (not the number of rows holding values).
    pub row_count: u64,
}

/// Summary of a completed bulk write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
    /// Rows appended to the grid before writing.
    pub rows_added: u64,
    pub header_written: bool,
    /// Row where the first data batch landed.
    pub first_row: u64,
    /// Cursor after the last committed batch.
    pub next_row: u64,
    pub rows_written: u64,
    pub batches_committed: u32,
}

/// Summary of a full sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub pages_fetched: u32,
    pub records_fetched: u64,
    pub duplicates_dropped: u64,
    pub write: WriteReport,
}
