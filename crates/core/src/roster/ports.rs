//! Port interfaces for the source roster API
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use rostersync_domain::{AccessToken, ClientId, ClientRecord, ClientStatus, Result};

/// Trait for reading the client collection page by page
#[async_trait]
pub trait ClientSource: Send + Sync {
    /// Fetch up to `limit` records starting at `offset`.
    ///
    /// An empty vector means there is nothing left to read.
    async fn fetch_page(
        &self,
        token: &AccessToken,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ClientRecord>>;
}

/// Trait for looking up current client statuses
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch statuses for all `ids` in a single request
    async fn fetch_statuses(
        &self,
        token: &AccessToken,
        ids: &[ClientId],
    ) -> Result<Vec<ClientStatus>>;
}
