//! In-memory fakes of every core port.
//!
//! Shared by the unit tests in this crate and, through the `test-utils`
//! feature, by downstream crates.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rostersync_domain::{
    AccessToken, ClientId, ClientRecord, ClientStatus, Registration, Result, RosterSyncError,
    SheetMetadata, SheetRow,
};

use crate::export::ports::{ProgressObserver, TabularStore};
use crate::export::retry::Sleeper;
use crate::roster::ports::{ClientSource, StatusSource};
use crate::session::ports::CredentialProvider;

/// Build a fully populated record with a numeric id.
pub fn client(id: i64) -> ClientRecord {
    ClientRecord {
        id: ClientId::Number(id),
        first_name: Some(format!("First{id}")),
        last_name: Some(format!("Last{id}")),
        gender: Some(if id % 2 == 0 { "female" } else { "male" }.to_string()),
        address: Some(format!("{id} Main Street")),
        city: Some("Springfield".to_string()),
        phone: Some(format!("+1-555-{id:04}")),
        email: Some(format!("client{id}@example.com")),
    }
}

/// Records with ids `1..=count`.
pub fn clients(count: i64) -> Vec<ClientRecord> {
    (1..=count).map(client).collect()
}

/// Fake roster API: credentials, paginated clients and statuses.
#[derive(Default)]
pub struct FakeRoster {
    records: Vec<ClientRecord>,
    statuses: HashMap<ClientId, String>,
    registration: Option<Result<Registration>>,
    login_error: Option<RosterSyncError>,
    fail_fetch_at_offset: Option<u64>,
    fail_statuses: bool,
    page_calls: Mutex<Vec<(u32, u64)>>,
    status_calls: Mutex<Vec<Vec<ClientId>>>,
    tokens_seen: Mutex<Vec<String>>,
}

impl FakeRoster {
    pub fn new(records: Vec<ClientRecord>) -> Self {
        Self { records, ..Self::default() }
    }

    pub fn with_status(mut self, id: ClientId, status: &str) -> Self {
        self.statuses.insert(id, status.to_string());
        self
    }

    pub fn with_registration(mut self, outcome: Result<Registration>) -> Self {
        self.registration = Some(outcome);
        self
    }

    pub fn failing_login(mut self, error: RosterSyncError) -> Self {
        self.login_error = Some(error);
        self
    }

    pub fn failing_fetch_at(mut self, offset: u64) -> Self {
        self.fail_fetch_at_offset = Some(offset);
        self
    }

    pub fn failing_statuses(mut self) -> Self {
        self.fail_statuses = true;
        self
    }

    /// `(limit, offset)` of every page request, in order.
    pub fn page_calls(&self) -> Vec<(u32, u64)> {
        self.page_calls.lock().expect("page call log poisoned").clone()
    }

    /// Identifier batches of every status request, in order.
    pub fn status_calls(&self) -> Vec<Vec<ClientId>> {
        self.status_calls.lock().expect("status call log poisoned").clone()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().expect("token log poisoned").clone()
    }
}

#[async_trait]
impl CredentialProvider for FakeRoster {
    async fn register(&self, _principal: &str) -> Result<Registration> {
        self.registration.clone().unwrap_or(Ok(Registration::Created))
    }

    async fn login(&self, principal: &str) -> Result<AccessToken> {
        match &self.login_error {
            Some(err) => Err(err.clone()),
            None => Ok(AccessToken::new(format!("token-for-{principal}"))),
        }
    }
}

#[async_trait]
impl ClientSource for FakeRoster {
    async fn fetch_page(
        &self,
        token: &AccessToken,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ClientRecord>> {
        self.page_calls.lock().expect("page call log poisoned").push((limit, offset));
        self.tokens_seen.lock().expect("token log poisoned").push(token.as_str().to_string());

        if self.fail_fetch_at_offset == Some(offset) {
            return Err(RosterSyncError::Network(format!("connection reset at offset {offset}")));
        }

        let start = (offset as usize).min(self.records.len());
        let end = start.saturating_add(limit as usize).min(self.records.len());
        Ok(self.records[start..end].to_vec())
    }
}

#[async_trait]
impl StatusSource for FakeRoster {
    async fn fetch_statuses(
        &self,
        _token: &AccessToken,
        ids: &[ClientId],
    ) -> Result<Vec<ClientStatus>> {
        self.status_calls.lock().expect("status call log poisoned").push(ids.to_vec());

        if self.fail_statuses {
            return Err(RosterSyncError::Source("status endpoint returned 500".into()));
        }

        Ok(ids
            .iter()
            .filter_map(|id| {
                self.statuses
                    .get(id)
                    .map(|status| ClientStatus { id: id.clone(), status: Some(status.clone()) })
            })
            .collect())
    }
}

#[derive(Debug)]
struct SheetState {
    row_count: u64,
    values: Vec<SheetRow>,
    append_requests: Vec<u64>,
    write_attempts: Vec<u64>,
    commits: Vec<(u64, usize)>,
    scripted: HashMap<u64, VecDeque<RosterSyncError>>,
}

/// Fake destination sheet holding values in memory.
///
/// Failures queued with [`FakeSheet::fail_writes_at`] are returned, in
/// order, by the next write attempts at that start row; a failed attempt
/// commits nothing.
#[derive(Debug)]
pub struct FakeSheet {
    state: Mutex<SheetState>,
    always_rate_limited: bool,
}

impl FakeSheet {
    pub fn new(row_count: u64) -> Self {
        Self {
            state: Mutex::new(SheetState {
                row_count,
                values: Vec::new(),
                append_requests: Vec::new(),
                write_attempts: Vec::new(),
                commits: Vec::new(),
                scripted: HashMap::new(),
            }),
            always_rate_limited: false,
        }
    }

    /// Sheet that already holds `rows`, with matching capacity.
    pub fn with_values(rows: Vec<SheetRow>) -> Self {
        let sheet = Self::new(rows.len() as u64);
        sheet.lock().values = rows;
        sheet
    }

    pub fn always_rate_limited(mut self) -> Self {
        self.always_rate_limited = true;
        self
    }

    pub fn fail_writes_at(
        &self,
        start_row: u64,
        errors: impl IntoIterator<Item = RosterSyncError>,
    ) {
        self.lock().scripted.entry(start_row).or_default().extend(errors);
    }

    pub fn row_count(&self) -> u64 {
        self.lock().row_count
    }

    pub fn values(&self) -> Vec<SheetRow> {
        self.lock().values.clone()
    }

    pub fn append_requests(&self) -> Vec<u64> {
        self.lock().append_requests.clone()
    }

    /// Start row of every write attempt, successful or not.
    pub fn write_attempts(&self) -> Vec<u64> {
        self.lock().write_attempts.clone()
    }

    /// `(start_row, row_count)` of every committed write.
    pub fn commits(&self) -> Vec<(u64, usize)> {
        self.lock().commits.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SheetState> {
        self.state.lock().expect("sheet state poisoned")
    }
}

#[async_trait]
impl TabularStore for FakeSheet {
    async fn sheet_metadata(&self) -> Result<SheetMetadata> {
        Ok(SheetMetadata { sheet_id: 0, title: "Sheet1".into(), row_count: self.lock().row_count })
    }

    async fn append_rows(&self, _sheet: &SheetMetadata, count: u64) -> Result<()> {
        let mut state = self.lock();
        state.append_requests.push(count);
        state.row_count += count;
        Ok(())
    }

    async fn existing_row_count(&self) -> Result<u64> {
        Ok(self.lock().values.len() as u64)
    }

    async fn write_rows(&self, start_row: u64, rows: &[SheetRow]) -> Result<()> {
        let mut state = self.lock();
        state.write_attempts.push(start_row);

        if self.always_rate_limited {
            return Err(RosterSyncError::RateLimited("quota exceeded".into()));
        }
        if let Some(err) = state.scripted.get_mut(&start_row).and_then(VecDeque::pop_front) {
            return Err(err);
        }

        let first = (start_row - 1) as usize;
        if state.values.len() < first + rows.len() {
            state.values.resize(first + rows.len(), Vec::new());
        }
        for (offset, row) in rows.iter().enumerate() {
            state.values[first + offset] = row.clone();
        }
        state.commits.push((start_row, rows.len()));
        Ok(())
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().expect("sleeper log poisoned").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().expect("sleeper log poisoned").push(duration);
    }
}

/// Observer that records every progress callback.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(u64, u64)>>,
    started: Mutex<Option<u64>>,
    finished: Mutex<bool>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<(u64, u64)> {
        self.events.lock().expect("observer log poisoned").clone()
    }

    pub fn started_with(&self) -> Option<u64> {
        *self.started.lock().expect("observer log poisoned")
    }

    pub fn finished(&self) -> bool {
        *self.finished.lock().expect("observer log poisoned")
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_start(&self, total_rows: u64) {
        *self.started.lock().expect("observer log poisoned") = Some(total_rows);
    }

    fn on_batch_committed(&self, rows_committed: u64, total_rows: u64) {
        self.events.lock().expect("observer log poisoned").push((rows_committed, total_rows));
    }

    fn on_finish(&self) {
        *self.finished.lock().expect("observer log poisoned") = true;
    }
}
