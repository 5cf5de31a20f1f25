//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Destination schema. Column order is fixed by the destination sheet.
pub const SHEET_HEADER: [&str; 9] =
    ["ID", "First Name", "Last Name", "Gender", "Address", "City", "Phone", "Email", "Status"];
pub const SHEET_COLUMN_COUNT: usize = SHEET_HEADER.len();
pub const UNKNOWN_STATUS: &str = "Unknown";
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

// Pagination
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

// Bulk writer
pub const MAX_WRITE_BATCH_SIZE: usize = 1000;
pub const DEFAULT_WRITE_BATCH_SIZE: usize = MAX_WRITE_BATCH_SIZE;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 60_000;

// Transport
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
