//! # RosterSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The retrying reqwest HTTP client
//! - The roster API adapter (registration, login, clients, statuses)
//! - The Google Sheets adapter and its service-account token provider
//! - The configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `rostersync-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod config;
pub mod errors;
pub mod http;
pub mod roster;
pub mod sheets;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use roster::RosterApiClient;
pub use sheets::{
    AccessTokenProvider, GoogleSheetsStore, ServiceAccountKey, ServiceAccountTokenProvider,
    StaticTokenProvider, SPREADSHEETS_SCOPE, TOKEN_EXCHANGE_ATTEMPTS,
};
