//! Service-account authentication for the spreadsheet API
//!
//! A RS256-signed JWT assertion is exchanged for a short-lived access token
//! (OAuth 2.0 JWT bearer grant). Tokens are cached and refreshed shortly
//! before they expire.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Method;
use rostersync_domain::{Result, RosterSyncError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// OAuth scope granting read/write access to spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Attempts for a token exchange that fails at the transport level or with
/// a 5xx status
pub const TOKEN_EXCHANGE_ATTEMPTS: usize = 3;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with fixed tokens.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, refreshing it if needed
    async fn access_token(&self) -> Result<String>;
}

/// Provider returning the same token forever
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(String);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Fields of a service-account JSON key file used for signing
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    ///
    /// # Errors
    /// `NotFound` if the file is missing, `Config` if it is not a
    /// service-account key.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(InfraError::from)?;
        Self::from_json(&contents).map_err(|err| {
            RosterSyncError::Config(format!(
                "invalid service-account key {}: {err}",
                path.display()
            ))
        })
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|err| RosterSyncError::Config(format!("invalid service-account key: {err}")))
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges signed service-account assertions for access tokens
pub struct ServiceAccountTokenProvider {
    http: HttpClient,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    scope: String,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl ServiceAccountTokenProvider {
    /// HTTP client for the token endpoint, retrying transient failures.
    pub fn http_client(timeout: StdDuration) -> Result<HttpClient> {
        HttpClient::builder().timeout(timeout).max_attempts(TOKEN_EXCHANGE_ATTEMPTS).build()
    }

    /// # Errors
    /// `Auth` if the private key is not a valid RSA PEM.
    pub fn new(http: HttpClient, key: ServiceAccountKey) -> Result<Self> {
        let signing_key =
            EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(InfraError::from)?;
        Ok(Self {
            http,
            key,
            signing_key,
            scope: SPREADSHEETS_SCOPE.to_string(),
            cache: Arc::new(Mutex::new(None)),
        })
    }

    pub fn from_key_file(http: HttpClient, path: &Path) -> Result<Self> {
        Self::new(http, ServiceAccountKey::from_file(path)?)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|err| InfraError::from(err).into())
    }

    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    async fn exchange(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;
        let request = self
            .http
            .request(Method::POST, &self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);
        let response = self.http.send_for_text(request).await?;

        if !response.status.is_success() {
            return Err(RosterSyncError::Auth(format!(
                "token exchange failed with HTTP {}: {}",
                response.status.as_u16(),
                response.body.trim()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response.body).map_err(|err| {
            RosterSyncError::Auth(format!("unexpected token exchange response: {err}"))
        })?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        info!(expires_in = lifetime, "obtained spreadsheet access token");

        Ok(CachedToken { value: token.access_token, expires_at: now + Duration::seconds(lifetime) })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        let refresh_after = Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS);

        if let Some(token) = cache.as_ref().filter(|token| token.expires_at > refresh_after) {
            debug!("using cached spreadsheet access token");
            return Ok(token.value.clone());
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }
}
