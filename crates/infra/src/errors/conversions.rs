//! Conversions from external infrastructure errors into domain errors.

use jsonwebtoken::errors::Error as JwtError;
use reqwest::{Error as HttpError, StatusCode};
use rostersync_domain::RosterSyncError;

/// Longest response body excerpt carried into an error message
const BODY_EXCERPT_LIMIT: usize = 512;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RosterSyncError);

impl From<InfraError> for RosterSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RosterSyncError> for InfraError {
    fn from(value: RosterSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRosterSyncError {
    fn into_rostersync(self) -> RosterSyncError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RosterSyncError */
/* -------------------------------------------------------------------------- */

impl IntoRosterSyncError for HttpError {
    fn into_rostersync(self) -> RosterSyncError {
        if self.is_timeout() {
            return RosterSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return RosterSyncError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return RosterSyncError::InvalidInput(format!("failed to decode HTTP body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => RosterSyncError::Auth(message),
                404 => RosterSyncError::NotFound(message),
                429 => RosterSyncError::RateLimited(message),
                _ => RosterSyncError::Network(message),
            };
        }

        RosterSyncError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_rostersync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / io / jsonwebtoken / url → RosterSyncError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(RosterSyncError::InvalidInput(format!("invalid JSON: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        let mapped = match value.kind() {
            std::io::ErrorKind::NotFound => RosterSyncError::NotFound(value.to_string()),
            _ => RosterSyncError::Internal(format!("I/O error: {value}")),
        };
        InfraError(mapped)
    }
}

impl From<JwtError> for InfraError {
    fn from(value: JwtError) -> Self {
        InfraError(RosterSyncError::Auth(format!("failed to sign service-account JWT: {value}")))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(RosterSyncError::Config(format!("invalid URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Non-success HTTP responses */
/* -------------------------------------------------------------------------- */

fn describe(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {} {}", status.as_u16(), reason);
    }

    let excerpt: String = body.chars().take(BODY_EXCERPT_LIMIT).collect();
    format!("HTTP {} {}: {}", status.as_u16(), reason, excerpt)
}

/// Map a non-success roster API response.
pub fn source_status_error(status: StatusCode, body: &str) -> RosterSyncError {
    let message = describe(status, body);
    match status.as_u16() {
        401 | 403 => RosterSyncError::Auth(message),
        _ => RosterSyncError::Source(message),
    }
}

/// Map a non-success spreadsheet API response. Only 429 is retryable.
pub fn destination_status_error(status: StatusCode, body: &str) -> RosterSyncError {
    let message = describe(status, body);
    match status.as_u16() {
        429 => RosterSyncError::RateLimited(message),
        401 | 403 => RosterSyncError::Auth(message),
        404 => RosterSyncError::NotFound(message),
        _ => RosterSyncError::Destination(message),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: RosterSyncError = InfraError::from(error).into();
        match mapped {
            RosterSyncError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn destination_429_is_rate_limited() {
        let err = destination_status_error(StatusCode::TOO_MANY_REQUESTS, "quota");
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn destination_other_statuses_are_not_retryable() {
        assert!(matches!(
            destination_status_error(StatusCode::BAD_REQUEST, "bad range"),
            RosterSyncError::Destination(msg) if msg.contains("bad range")
        ));
        assert!(matches!(
            destination_status_error(StatusCode::FORBIDDEN, ""),
            RosterSyncError::Auth(_)
        ));
        assert!(matches!(
            destination_status_error(StatusCode::INTERNAL_SERVER_ERROR, ""),
            RosterSyncError::Destination(_)
        ));
    }

    #[test]
    fn source_errors_keep_status_and_body() {
        let err = source_status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err, RosterSyncError::Source("HTTP 502 Bad Gateway: upstream down".into()));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(5000);
        let err = source_status_error(StatusCode::BAD_REQUEST, &body);
        assert!(err.to_string().len() < 700);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "creds.json");
        let mapped: RosterSyncError = InfraError::from(io).into();
        assert!(matches!(mapped, RosterSyncError::NotFound(_)));
    }

    #[test]
    fn bad_url_maps_to_config_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let mapped: RosterSyncError = InfraError::from(err).into();
        assert!(matches!(mapped, RosterSyncError::Config(_)));
    }
}
