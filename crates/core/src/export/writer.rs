//! Capacity-aware, rate-limit tolerant bulk writer
//!
//! A write runs in three steps:
//! 1. grow the sheet so it can hold every data row plus a header row
//! 2. place the header on an empty sheet, otherwise append after the last
//!    row holding values
//! 3. write the rows in bounded batches, retrying a rate-limited batch at
//!    the same cursor
//!
//! The cursor only moves after a batch commits, so a failed run never leaves
//! a gap between committed batches.

use std::sync::Arc;

use rostersync_domain::constants::{DEFAULT_WRITE_BATCH_SIZE, MAX_WRITE_BATCH_SIZE};
use rostersync_domain::{header_row, ExportRow, Result, RosterSyncError, SheetRow, WriteReport};
use tracing::{debug, info, warn};

use super::ports::{ProgressObserver, TabularStore};
use super::retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Lands export rows into a [`TabularStore`].
pub struct TabularWriter {
    store: Arc<dyn TabularStore>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    batch_size: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl TabularWriter {
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            batch_size: DEFAULT_WRITE_BATCH_SIZE,
            observer: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Rows per write request, clamped to `1..=1000`
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_WRITE_BATCH_SIZE);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Write `rows` after any existing content.
    ///
    /// # Errors
    /// Capacity and header failures are returned as-is. A batch that stays
    /// rate limited for every attempt fails with
    /// `RosterSyncError::RetriesExhausted`; any other write error fails
    /// immediately. Batches after a failed one are never attempted.
    pub async fn write(&self, rows: &[ExportRow]) -> Result<WriteReport> {
        let rows_added = self.ensure_capacity(rows.len()).await?;
        let (cursor, header_written) = self.place_header().await?;
        let mut report = WriteReport {
            rows_added,
            header_written,
            first_row: cursor,
            next_row: cursor,
            ..WriteReport::default()
        };

        let total = rows.len() as u64;
        if let Some(observer) = &self.observer {
            observer.on_start(total);
        }

        for batch in rows.chunks(self.batch_size) {
            let cells: Vec<SheetRow> = batch.iter().map(ExportRow::to_sheet_row).collect();
            self.write_batch(report.next_row, &cells).await?;

            report.next_row += cells.len() as u64;
            report.rows_written += cells.len() as u64;
            report.batches_committed += 1;
            if let Some(observer) = &self.observer {
                observer.on_batch_committed(report.rows_written, total);
            }
        }

        if let Some(observer) = &self.observer {
            observer.on_finish();
        }
        info!(
            rows_written = report.rows_written,
            batches = report.batches_committed,
            first_row = report.first_row,
            next_row = report.next_row,
            "export written"
        );
        Ok(report)
    }

    /// Grow the sheet so it holds `data_rows` plus one header row.
    /// Returns the number of rows added.
    async fn ensure_capacity(&self, data_rows: usize) -> Result<u64> {
        let sheet = self.store.sheet_metadata().await?;
        let rows_needed = data_rows as u64 + 1;

        if rows_needed <= sheet.row_count {
            debug!(rows_needed, capacity = sheet.row_count, "sheet capacity sufficient");
            return Ok(0);
        }

        let missing = rows_needed - sheet.row_count;
        info!(sheet = %sheet.title, capacity = sheet.row_count, adding = missing, "extending sheet");
        self.store.append_rows(&sheet, missing).await?;
        Ok(missing)
    }

    /// Write the header on an empty sheet. Returns the first data row and
    /// whether the header was written.
    async fn place_header(&self) -> Result<(u64, bool)> {
        let existing = self.store.existing_row_count().await?;
        if existing > 0 {
            debug!(existing, "sheet has content, appending after it");
            return Ok((existing + 1, false));
        }

        self.store.write_rows(1, &[header_row()]).await?;
        info!("header row written");
        Ok((2, true))
    }

    async fn write_batch(&self, start_row: u64, rows: &[SheetRow]) -> Result<()> {
        let last_row = start_row + rows.len() as u64 - 1;
        let mut attempt = 1;

        loop {
            match self.store.write_rows(start_row, rows).await {
                Ok(()) => {
                    debug!(start_row, last_row, attempt, "batch written");
                    return Ok(());
                }
                Err(err) if err.is_rate_limited() => {
                    if attempt >= self.retry.max_attempts {
                        warn!(start_row, last_row, attempt, "rate limited, giving up on batch");
                        return Err(RosterSyncError::RetriesExhausted {
                            first_row: start_row,
                            last_row,
                            attempts: attempt,
                        });
                    }

                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        start_row,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, retrying batch"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
