//! # RosterSync Domain
//!
//! Business domain types and models for RosterSync.
//!
//! This crate contains:
//! - Roster data types (ClientRecord, StatusMap, ExportRow, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (sheet header, sentinel status, batch limits)
//!
//! ## Architecture
//! - No dependencies on other RosterSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
