//! Domain types and models

pub mod auth;
pub mod client;
pub mod sheet;

pub use auth::{AccessToken, Registration};
pub use client::{ClientId, ClientRecord, ClientStatus, ExportRow, StatusMap};
pub use sheet::{header_row, SheetMetadata, SheetRow, SyncReport, WriteReport};
