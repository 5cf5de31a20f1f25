//! Google Sheets v4 implementation of [`TabularStore`]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use rostersync_core::TabularStore;
use rostersync_domain::{Result, RosterSyncError, SheetMetadata, SheetRow};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use super::auth::AccessTokenProvider;
use crate::errors::{destination_status_error, InfraError};
use crate::http::HttpClient;

/// Public Sheets API root
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/";

#[derive(Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u64,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// One sheet (tab) of a spreadsheet
pub struct GoogleSheetsStore {
    http: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: Url,
    spreadsheet_id: String,
    sheet_name: String,
}

impl GoogleSheetsStore {
    /// HTTP client for spreadsheet data calls.
    ///
    /// Single attempt: every failure reaches [`rostersync_core::TabularWriter`]
    /// as is, and the writer alone decides whether a batch is retried.
    pub fn http_client(timeout: Duration) -> Result<HttpClient> {
        HttpClient::builder().timeout(timeout).max_attempts(1).build()
    }

    pub fn new(
        http: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(SHEETS_API_BASE).map_err(InfraError::from)?;
        Ok(Self {
            http,
            tokens,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        })
    }

    /// Point the store at another API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = crate::roster::normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// `spreadsheets/{id}{suffix}` followed by `extra` path segments
    fn url(&self, suffix: &str, extra: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RosterSyncError::Config(format!("spreadsheet API base {} cannot hold a path", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .push("spreadsheets")
                .push(&format!("{}{}", self.spreadsheet_id, suffix))
                .extend(extra);
        }
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<T> {
        let token = self.tokens.access_token().await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = self.http.send_for_text(request).await?;
        if !response.status.is_success() {
            return Err(destination_status_error(response.status, &response.body));
        }

        let body = if response.body.trim().is_empty() { "{}" } else { response.body.as_str() };
        serde_json::from_str(body).map_err(|err| {
            RosterSyncError::Destination(format!("unexpected spreadsheet API response: {err}"))
        })
    }
}

/// Quote a sheet title for A1 notation when it is not a plain identifier.
fn a1_sheet(title: &str) -> String {
    if !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    #[instrument(skip(self), fields(spreadsheet = %self.spreadsheet_id, sheet = %self.sheet_name))]
    async fn sheet_metadata(&self) -> Result<SheetMetadata> {
        let mut url = self.url("", &[])?;
        url.query_pairs_mut().append_pair("includeGridData", "false");

        let spreadsheet: Spreadsheet = self.call(Method::GET, url, None).await?;
        let sheet = spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|properties| properties.title == self.sheet_name)
            .ok_or_else(|| {
                RosterSyncError::NotFound(format!(
                    "sheet '{}' not found in spreadsheet {}",
                    self.sheet_name, self.spreadsheet_id
                ))
            })?;

        debug!(sheet_id = sheet.sheet_id, row_count = sheet.grid_properties.row_count, "sheet found");
        Ok(SheetMetadata {
            sheet_id: sheet.sheet_id,
            title: sheet.title,
            row_count: sheet.grid_properties.row_count,
        })
    }

    #[instrument(skip(self, sheet), fields(sheet_id = sheet.sheet_id))]
    async fn append_rows(&self, sheet: &SheetMetadata, count: u64) -> Result<()> {
        let url = self.url(":batchUpdate", &[])?;
        let body = json!({
            "requests": [{
                "appendDimension": {
                    "sheetId": sheet.sheet_id,
                    "dimension": "ROWS",
                    "length": count,
                }
            }]
        });

        let _: Value = self.call(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(sheet = %self.sheet_name))]
    async fn existing_row_count(&self) -> Result<u64> {
        let range = a1_sheet(&self.sheet_name);
        let url = self.url("", &["values", &range])?;

        let values: ValueRange = self.call(Method::GET, url, None).await?;
        Ok(values.values.len() as u64)
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn write_rows(&self, start_row: u64, rows: &[SheetRow]) -> Result<()> {
        let range = format!("{}!A{}", a1_sheet(&self.sheet_name), start_row);
        let mut url = self.url("", &["values", &range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });

        let _: Value = self.call(Method::PUT, url, Some(body)).await?;
        Ok(())
    }
}
