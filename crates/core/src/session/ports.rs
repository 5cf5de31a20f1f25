//! Port interfaces for session bootstrap

use async_trait::async_trait;
use rostersync_domain::{AccessToken, Registration, Result};

/// Trait for acquiring roster API credentials for a principal
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Register the principal. An existing registration is not an error.
    async fn register(&self, principal: &str) -> Result<Registration>;

    /// Log the principal in and return a token for subsequent calls
    async fn login(&self, principal: &str) -> Result<AccessToken>;
}
