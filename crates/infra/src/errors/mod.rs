//! Infrastructure error conversions

mod conversions;

pub use conversions::{destination_status_error, source_status_error, InfraError};
