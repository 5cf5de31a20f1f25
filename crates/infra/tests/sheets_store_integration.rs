//! Integration tests for the Google Sheets store against a mock server

mod support;

use rostersync_core::TabularStore;
use rostersync_domain::{header_row, RosterSyncError, SheetMetadata};
use serde_json::json;
use support::{sheets_store, SPREADSHEET_ID};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn spreadsheet_body() -> serde_json::Value {
    json!({
        "spreadsheetId": SPREADSHEET_ID,
        "sheets": [
            {"properties": {"sheetId": 0, "title": "Archive",
                            "gridProperties": {"rowCount": 10, "columnCount": 26}}},
            {"properties": {"sheetId": 812, "title": "Sheet1",
                            "gridProperties": {"rowCount": 1000, "columnCount": 26}}}
        ]
    })
}

#[tokio::test]
async fn finds_sheet_by_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}")))
        .and(query_param("includeGridData", "false"))
        .and(header("authorization", "Bearer sheets-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(spreadsheet_body()))
        .mount(&server)
        .await;

    let metadata = sheets_store(&server, "Sheet1").sheet_metadata().await.unwrap();

    assert_eq!(metadata, SheetMetadata { sheet_id: 812, title: "Sheet1".into(), row_count: 1000 });
}

#[tokio::test]
async fn missing_sheet_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(spreadsheet_body()))
        .mount(&server)
        .await;

    let err = sheets_store(&server, "Clients").sheet_metadata().await.unwrap_err();

    assert!(matches!(err, RosterSyncError::NotFound(msg) if msg.contains("Clients")));
}

#[tokio::test]
async fn appends_rows_with_append_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}:batchUpdate")))
        .and(body_json(json!({
            "requests": [{"appendDimension": {"sheetId": 812, "dimension": "ROWS", "length": 1501}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"replies": [{}]})))
        .expect(1)
        .mount(&server)
        .await;

    let sheet = SheetMetadata { sheet_id: 812, title: "Sheet1".into(), row_count: 1000 };
    sheets_store(&server, "Sheet1").append_rows(&sheet, 1501).await.unwrap();
}

#[tokio::test]
async fn counts_existing_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}/values/Sheet1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:I3",
            "majorDimension": "ROWS",
            "values": [["ID"], [1], [2]]
        })))
        .mount(&server)
        .await;

    assert_eq!(sheets_store(&server, "Sheet1").existing_row_count().await.unwrap(), 3);
}

#[tokio::test]
async fn absent_values_means_empty_sheet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}/values/Sheet1")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"range": "Sheet1!A1:Z1000", "majorDimension": "ROWS"})),
        )
        .mount(&server)
        .await;

    assert_eq!(sheets_store(&server, "Sheet1").existing_row_count().await.unwrap(), 0);
}

#[tokio::test]
async fn writes_rows_raw_at_start_row() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}/values/Sheet1!A1")))
        .and(query_param("valueInputOption", "RAW"))
        .and(body_json(json!({
            "range": "Sheet1!A1",
            "majorDimension": "ROWS",
            "values": [["ID", "First Name", "Last Name", "Gender", "Address", "City",
                        "Phone", "Email", "Status"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedRows": 1})))
        .expect(1)
        .mount(&server)
        .await;

    sheets_store(&server, "Sheet1").write_rows(1, &[header_row()]).await.unwrap();
}

#[tokio::test]
async fn throttled_write_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let err = sheets_store(&server, "Sheet1").write_rows(2, &[header_row()]).await.unwrap_err();

    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn rejected_write_is_destination_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Range exceeds grid limits"))
        .mount(&server)
        .await;

    let err = sheets_store(&server, "Sheet1").write_rows(2, &[header_row()]).await.unwrap_err();

    assert!(matches!(err, RosterSyncError::Destination(msg) if msg.contains("grid limits")));
}
