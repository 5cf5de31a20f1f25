//! Session bootstrap against the roster API

pub mod ports;

use rostersync_domain::{AccessToken, Registration, Result};
use tracing::{error, info, warn};

use self::ports::CredentialProvider;

/// Register `principal` (tolerating an existing registration) and log in.
///
/// Registration failures other than "already exists" are logged and do not
/// stop the bootstrap; the login result decides.
///
/// # Errors
/// Returns the login error when the provider cannot issue a token.
pub async fn acquire_token(
    provider: &dyn CredentialProvider,
    principal: &str,
) -> Result<AccessToken> {
    match provider.register(principal).await {
        Ok(Registration::Created) => info!(principal, "registered principal"),
        Ok(Registration::AlreadyExists) => info!(principal, "principal already registered"),
        Err(err) => warn!(principal, error = %err, "registration failed, attempting login anyway"),
    }

    provider.login(principal).await.map_err(|err| {
        error!(principal, error = %err, "login failed");
        err
    })
}
