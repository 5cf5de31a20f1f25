//! Roster source: pagination and status enrichment

pub mod enricher;
pub mod fetcher;
pub mod ports;
