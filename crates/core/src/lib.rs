//! # RosterSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the roster API and the destination
//!   sheet
//! - Session bootstrap, pagination, status enrichment
//! - The capacity-aware, rate-limit tolerant bulk writer
//! - The sync orchestrator tying them together
//!
//! ## Architecture Principles
//! - Only depends on `rostersync-domain`
//! - No HTTP or filesystem code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod export;
pub mod roster;
pub mod session;
pub mod sync;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use export::ports::{ProgressObserver, TabularStore};
pub use export::progress::TracingProgress;
pub use export::retry::{Backoff, RetryPolicy, Sleeper, TokioSleeper};
pub use export::writer::TabularWriter;
pub use roster::enricher::StatusEnricher;
pub use roster::fetcher::PaginatedFetcher;
pub use roster::ports::{ClientSource, StatusSource};
pub use session::ports::CredentialProvider;
pub use session::acquire_token;
pub use sync::{SyncOptions, SyncService};
