//! Shared fixtures for the infra integration tests

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use rostersync_infra::{GoogleSheetsStore, HttpClient, StaticTokenProvider};
use tempfile::NamedTempFile;
use wiremock::MockServer;

pub const TEST_PRIVATE_KEY: &str = include_str!("fixtures/test-service-account.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("fixtures/test-service-account.pub.pem");
pub const SPREADSHEET_ID: &str = "sheet-123";

pub fn http() -> HttpClient {
    HttpClient::new().expect("http client")
}

/// Write a service-account key file whose token endpoint is `token_uri`.
pub fn service_account_file(token_uri: &str) -> NamedTempFile {
    let key = serde_json::json!({
        "type": "service_account",
        "client_email": "exporter@rostersync-test.iam.gserviceaccount.com",
        "private_key": TEST_PRIVATE_KEY,
        "token_uri": token_uri,
    });
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(key.to_string().as_bytes()).expect("write key file");
    file
}

/// Sheets store pointed at `server` with a fixed bearer token.
pub fn sheets_store(server: &MockServer, sheet_name: &str) -> GoogleSheetsStore {
    GoogleSheetsStore::new(
        http(),
        Arc::new(StaticTokenProvider::new("sheets-token")),
        SPREADSHEET_ID,
        sheet_name,
    )
    .expect("sheets store")
    .with_base_url(&format!("{}/v4/", server.uri()))
    .expect("base url")
}
