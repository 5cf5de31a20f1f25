//! HTTP adapter for the roster API.
//!
//! Implements session bootstrap, client pagination and status lookup on top
//! of [`HttpClient`]. The API expects the login token verbatim in the
//! `Authorization` header, without a scheme prefix.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use rostersync_core::{ClientSource, CredentialProvider, StatusSource};
use rostersync_domain::{
    AccessToken, ClientId, ClientRecord, ClientStatus, Registration, Result, RosterSyncError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::{source_status_error, InfraError};
use crate::http::{HttpClient, TextResponse};

const REGISTRATION_PATH: &str = "auth/registration";
const LOGIN_PATH: &str = "auth/login";
const CLIENTS_PATH: &str = "clients";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery<'a> {
    user_ids: &'a [ClientId],
}

/// Roster API client
#[derive(Clone)]
pub struct RosterApiClient {
    http: HttpClient,
    base_url: Url,
}

impl RosterApiClient {
    /// Create a client rooted at `base_url`.
    ///
    /// A missing trailing slash is added so relative endpoints resolve under
    /// the base path rather than replacing its last segment.
    ///
    /// # Errors
    /// Returns `RosterSyncError::Config` if `base_url` does not parse.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|err| InfraError::from(err).into())
    }
}

/// Parse `raw` as a URL whose path ends with `/`.
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash =
        if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    Url::parse(&with_slash).map_err(|err| InfraError::from(err).into())
}

fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|err| {
        RosterSyncError::InvalidInput(format!("unexpected {what} payload: {err}"))
    })
}

/// Parse a list body where an empty body or JSON `null` means no entries.
fn parse_list<T: DeserializeOwned>(body: &str, what: &str) -> Result<Vec<T>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    parse_json::<Option<Vec<T>>>(trimmed, what).map(Option::unwrap_or_default)
}

fn is_existing_user(response: &TextResponse) -> bool {
    if response.status == StatusCode::BAD_REQUEST {
        return true;
    }
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("statusCode").and_then(Value::as_u64))
        .is_some_and(|code| code == 400)
}

#[async_trait]
impl CredentialProvider for RosterApiClient {
    #[instrument(skip(self))]
    async fn register(&self, principal: &str) -> Result<Registration> {
        let url = self.endpoint(REGISTRATION_PATH)?;
        let request =
            self.http.request(Method::POST, url).json(&Credentials { username: principal });
        let response = self.http.send_for_text(request).await?;

        if is_existing_user(&response) {
            return Ok(Registration::AlreadyExists);
        }
        if !response.status.is_success() {
            return Err(source_status_error(response.status, &response.body));
        }
        Ok(Registration::Created)
    }

    #[instrument(skip(self))]
    async fn login(&self, principal: &str) -> Result<AccessToken> {
        let url = self.endpoint(LOGIN_PATH)?;
        let request =
            self.http.request(Method::POST, url).json(&Credentials { username: principal });
        let response = self.http.send_for_text(request).await?;

        if !response.status.is_success() {
            let cause = source_status_error(response.status, &response.body);
            return Err(RosterSyncError::Auth(format!("login rejected: {cause}")));
        }

        let login: LoginResponse = parse_json(&response.body, "login")?;
        match login.token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(RosterSyncError::Auth("login response did not contain a token".into())),
        }
    }
}

#[async_trait]
impl ClientSource for RosterApiClient {
    #[instrument(skip(self, token))]
    async fn fetch_page(
        &self,
        token: &AccessToken,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ClientRecord>> {
        let url = self.endpoint(CLIENTS_PATH)?;
        let request = self
            .http
            .request(Method::GET, url)
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())])
            .header(AUTHORIZATION, token.as_str());
        let response = self.http.send_for_text(request).await?;

        if !response.status.is_success() {
            return Err(source_status_error(response.status, &response.body));
        }

        let records: Vec<ClientRecord> = parse_list(&response.body, "clients")?;
        debug!(records = records.len(), "client page received");
        Ok(records)
    }
}

#[async_trait]
impl StatusSource for RosterApiClient {
    #[instrument(skip(self, token, ids), fields(ids = ids.len()))]
    async fn fetch_statuses(
        &self,
        token: &AccessToken,
        ids: &[ClientId],
    ) -> Result<Vec<ClientStatus>> {
        let url = self.endpoint(CLIENTS_PATH)?;
        let request = self
            .http
            .request(Method::POST, url)
            .header(AUTHORIZATION, token.as_str())
            .json(&StatusQuery { user_ids: ids });
        let response = self.http.send_for_text(request).await?;

        if !response.status.is_success() {
            return Err(source_status_error(response.status, &response.body));
        }

        parse_list(&response.body, "statuses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base_url("https://roster.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://roster.example.com/api/");
        assert_eq!(url.join("clients").unwrap().as_str(), "https://roster.example.com/api/clients");
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        assert!(matches!(normalize_base_url("roster"), Err(RosterSyncError::Config(_))));
    }

    #[test]
    fn empty_and_null_lists_are_empty() {
        assert!(parse_list::<ClientRecord>("", "clients").unwrap().is_empty());
        assert!(parse_list::<ClientRecord>(" null ", "clients").unwrap().is_empty());
        assert!(parse_list::<ClientRecord>("[]", "clients").unwrap().is_empty());
    }

    #[test]
    fn malformed_list_is_invalid_input() {
        let err = parse_list::<ClientRecord>("{\"oops\":1}", "clients").unwrap_err();
        assert!(matches!(err, RosterSyncError::InvalidInput(_)));
    }

    #[test]
    fn detects_existing_user_by_status_or_body() {
        let by_status = TextResponse { status: StatusCode::BAD_REQUEST, body: String::new() };
        let by_body = TextResponse {
            status: StatusCode::OK,
            body: r#"{"statusCode":400,"message":"User exists"}"#.into(),
        };
        let created = TextResponse { status: StatusCode::CREATED, body: "{}".into() };

        assert!(is_existing_user(&by_status));
        assert!(is_existing_user(&by_body));
        assert!(!is_existing_user(&created));
    }
}
