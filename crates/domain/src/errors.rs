//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for RosterSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RosterSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Source API error: {0}")]
    Source(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Destination error: {0}")]
    Destination(String),

    #[error("Failed to write rows {first_row}-{last_row} after {attempts} attempts")]
    RetriesExhausted { first_row: u64, last_row: u64, attempts: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RosterSyncError {
    /// Whether the destination asked the caller to slow down and retry.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Source(_) => "source",
            Self::RateLimited(_) => "rate_limited",
            Self::Destination(_) => "destination",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for RosterSync operations
pub type Result<T> = std::result::Result<T, RosterSyncError>;
