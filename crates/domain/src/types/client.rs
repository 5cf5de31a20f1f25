//! Roster records as read from the source API and as exported to the sheet

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sheet::SheetRow;
use crate::constants::UNKNOWN_STATUS;

/// Client identifier.
///
/// The source API may emit either numeric or string identifiers; the value is
/// kept in its original JSON kind so it is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientId {
    Number(i64),
    Text(String),
}

impl ClientId {
    fn to_cell(&self) -> Value {
        match self {
            Self::Number(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ClientId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One client as returned by `GET clients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: ClientId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One entry of the `POST clients` status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatus {
    pub id: ClientId,
    #[serde(default)]
    pub status: Option<String>,
}

/// Identifier → status lookup built for a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMap(HashMap<ClientId, String>);

impl StatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for the same id replace earlier ones; entries without a
    /// status are skipped so they resolve to the sentinel.
    pub fn from_statuses(statuses: impl IntoIterator<Item = ClientStatus>) -> Self {
        let map = statuses
            .into_iter()
            .filter_map(|entry| entry.status.map(|status| (entry.id, status)))
            .collect();
        Self(map)
    }

    pub fn insert(&mut self, id: ClientId, status: impl Into<String>) {
        self.0.insert(id, status.into());
    }

    pub fn get(&self, id: &ClientId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Status for `id`, or [`UNKNOWN_STATUS`] when the lookup has none.
    pub fn resolve(&self, id: &ClientId) -> &str {
        self.get(id).unwrap_or(UNKNOWN_STATUS)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A client record merged with its resolved status, ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: ClientId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: String,
}

impl ExportRow {
    pub fn merge(record: ClientRecord, statuses: &StatusMap) -> Self {
        let status = statuses.resolve(&record.id).to_string();
        let ClientRecord { id, first_name, last_name, gender, address, city, phone, email } =
            record;

        Self { id, first_name, last_name, gender, address, city, phone, email, status }
    }

    /// Cells in destination column order:
    /// `id, firstName, lastName, gender, address, city, phone, email, status`.
    pub fn to_sheet_row(&self) -> SheetRow {
        fn text(value: &Option<String>) -> Value {
            Value::from(value.as_deref().unwrap_or_default())
        }

        vec![
            self.id.to_cell(),
            text(&self.first_name),
            text(&self.last_name),
            text(&self.gender),
            text(&self.address),
            text(&self.city),
            text(&self.phone),
            text(&self.email),
            Value::from(self.status.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::constants::SHEET_COLUMN_COUNT;

    fn record(id: i64) -> ClientRecord {
        ClientRecord {
            id: ClientId::Number(id),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            gender: Some("female".into()),
            address: Some("12 St James's Square".into()),
            city: Some("London".into()),
            phone: Some("+44 20 0000".into()),
            email: Some("ada@example.com".into()),
        }
    }

    #[test]
    fn parses_source_payload_with_missing_fields() {
        let payload = json!([
            {"id": 7, "firstName": "Ada", "lastName": "Lovelace", "city": null},
            {"id": "c-9", "email": "x@example.com", "extra": true}
        ]);

        let records: Vec<ClientRecord> = serde_json::from_value(payload).unwrap();

        assert_eq!(records[0].id, ClientId::Number(7));
        assert_eq!(records[0].first_name.as_deref(), Some("Ada"));
        assert_eq!(records[0].city, None);
        assert_eq!(records[1].id, ClientId::Text("c-9".into()));
        assert_eq!(records[1].gender, None);
    }

    #[test]
    fn missing_status_resolves_to_unknown() {
        let statuses = StatusMap::from_statuses(vec![
            ClientStatus { id: ClientId::Number(1), status: Some("Active".into()) },
            ClientStatus { id: ClientId::Number(2), status: None },
        ]);

        assert_eq!(statuses.resolve(&ClientId::Number(1)), "Active");
        assert_eq!(statuses.resolve(&ClientId::Number(2)), UNKNOWN_STATUS);
        assert_eq!(statuses.resolve(&ClientId::Number(3)), UNKNOWN_STATUS);
        assert_eq!(statuses.len(), 1);
    }

    #[test]
    fn later_status_entry_wins() {
        let statuses = StatusMap::from_statuses(vec![
            ClientStatus { id: ClientId::Number(1), status: Some("Lead".into()) },
            ClientStatus { id: ClientId::Number(1), status: Some("Customer".into()) },
        ]);

        assert_eq!(statuses.resolve(&ClientId::Number(1)), "Customer");
    }

    #[test]
    fn sheet_row_follows_destination_column_order() {
        let mut statuses = StatusMap::new();
        statuses.insert(ClientId::Number(42), "Active");

        let row = ExportRow::merge(record(42), &statuses).to_sheet_row();

        assert_eq!(row.len(), SHEET_COLUMN_COUNT);
        assert_eq!(
            row,
            vec![
                json!(42),
                json!("Ada"),
                json!("Lovelace"),
                json!("female"),
                json!("12 St James's Square"),
                json!("London"),
                json!("+44 20 0000"),
                json!("ada@example.com"),
                json!("Active"),
            ]
        );
    }

    #[test]
    fn absent_fields_become_empty_cells() {
        let sparse = ClientRecord {
            id: ClientId::Text("abc".into()),
            first_name: None,
            last_name: None,
            gender: None,
            address: None,
            city: None,
            phone: None,
            email: None,
        };

        let row = ExportRow::merge(sparse, &StatusMap::new()).to_sheet_row();

        assert_eq!(row[0], json!("abc"));
        assert!(row[1..8].iter().all(|cell| cell == &json!("")));
        assert_eq!(row[8], json!(UNKNOWN_STATUS));
    }
}
