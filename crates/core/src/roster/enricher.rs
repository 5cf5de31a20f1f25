//! Per-page status enrichment

use std::collections::HashSet;
use std::sync::Arc;

use rostersync_domain::{AccessToken, ClientId, ClientRecord, ExportRow, Result, StatusMap};
use tracing::debug;

use super::ports::StatusSource;

/// Looks up statuses for a page of records and merges them in.
pub struct StatusEnricher {
    source: Arc<dyn StatusSource>,
}

impl StatusEnricher {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }

    /// Fetch statuses for `ids` with a single request.
    ///
    /// An empty id list makes no request and yields an empty map.
    pub async fn fetch_statuses(&self, token: &AccessToken, ids: &[ClientId]) -> Result<StatusMap> {
        if ids.is_empty() {
            return Ok(StatusMap::new());
        }

        let statuses = self.source.fetch_statuses(token, ids).await?;
        let map = StatusMap::from_statuses(statuses);
        debug!(requested = ids.len(), resolved = map.len(), "fetched statuses");
        Ok(map)
    }

    /// Merge a page of records with a status map; missing statuses become
    /// the sentinel.
    pub fn merge(records: Vec<ClientRecord>, statuses: &StatusMap) -> Vec<ExportRow> {
        records.into_iter().map(|record| ExportRow::merge(record, statuses)).collect()
    }

    /// Enrich one page: distinct ids in first-seen order, one status call,
    /// then merge.
    pub async fn enrich(
        &self,
        token: &AccessToken,
        records: Vec<ClientRecord>,
    ) -> Result<Vec<ExportRow>> {
        let ids = distinct_ids(&records);
        let statuses = self.fetch_statuses(token, &ids).await?;
        Ok(Self::merge(records, &statuses))
    }
}

fn distinct_ids(records: &[ClientRecord]) -> Vec<ClientId> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| seen.insert(&record.id))
        .map(|record| record.id.clone())
        .collect()
}
