//! Sync orchestrator - core business logic
//!
//! Bootstraps a session, walks every page of the roster, enriches each page
//! with statuses and hands the accumulated rows to the writer once. The
//! writer is only reached after pagination has fully succeeded.

use std::collections::HashSet;
use std::sync::Arc;

use rostersync_domain::config::{DuplicatePolicy, PageTermination};
use rostersync_domain::constants::DEFAULT_PAGE_SIZE;
use rostersync_domain::{AccessToken, ExportRow, Result, SyncConfig, SyncReport};
use tracing::{info, instrument};

use crate::export::writer::TabularWriter;
use crate::roster::enricher::StatusEnricher;
use crate::roster::fetcher::PaginatedFetcher;
use crate::roster::ports::ClientSource;
use crate::session::acquire_token;
use crate::session::ports::CredentialProvider;

/// Orchestrator settings taken from [`SyncConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub principal: String,
    pub page_size: u32,
    pub termination: PageTermination,
    pub duplicates: DuplicatePolicy,
}

impl SyncOptions {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            page_size: DEFAULT_PAGE_SIZE,
            termination: PageTermination::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            principal: config.principal.clone(),
            page_size: config.page_size,
            termination: config.termination,
            duplicates: config.duplicates,
        }
    }
}

/// Rows gathered by a completed pagination pass
#[derive(Debug, Default)]
struct Collected {
    rows: Vec<ExportRow>,
    pages: u32,
    records: u64,
    duplicates_dropped: u64,
}

enum State {
    Fetching,
    Done,
}

/// Roster to sheet sync service
pub struct SyncService {
    credentials: Arc<dyn CredentialProvider>,
    clients: Arc<dyn ClientSource>,
    enricher: StatusEnricher,
    writer: TabularWriter,
    options: SyncOptions,
}

impl SyncService {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        clients: Arc<dyn ClientSource>,
        enricher: StatusEnricher,
        writer: TabularWriter,
        options: SyncOptions,
    ) -> Self {
        Self { credentials, clients, enricher, writer, options }
    }

    /// Run one full export.
    ///
    /// # Errors
    /// Login, fetch and enrichment failures abort the run before anything is
    /// written. Writer errors are returned as the writer reports them.
    #[instrument(skip(self), fields(principal = %self.options.principal))]
    pub async fn run(&self) -> Result<SyncReport> {
        let token = acquire_token(self.credentials.as_ref(), &self.options.principal).await?;
        let collected = self.collect(token).await?;

        info!(
            pages = collected.pages,
            records = collected.records,
            rows = collected.rows.len(),
            duplicates_dropped = collected.duplicates_dropped,
            "roster collected"
        );

        let write = self.writer.write(&collected.rows).await?;

        Ok(SyncReport {
            pages_fetched: collected.pages,
            records_fetched: collected.records,
            duplicates_dropped: collected.duplicates_dropped,
            write,
        })
    }

    async fn collect(&self, token: AccessToken) -> Result<Collected> {
        let mut fetcher = PaginatedFetcher::new(self.clients.clone(), token, self.options.page_size)
            .with_termination(self.options.termination);
        let mut seen = HashSet::new();
        let mut collected = Collected::default();
        let mut state = State::Fetching;

        while let State::Fetching = state {
            state = match fetcher.next_page().await? {
                Some(page) => {
                    collected.records += page.len() as u64;
                    let rows = self.enricher.enrich(fetcher.token(), page).await?;
                    for row in rows {
                        if self.options.duplicates == DuplicatePolicy::DedupeById
                            && !seen.insert(row.id.clone())
                        {
                            collected.duplicates_dropped += 1;
                            continue;
                        }
                        collected.rows.push(row);
                    }
                    State::Fetching
                }
                None => State::Done,
            };
        }

        collected.pages = fetcher.calls();
        Ok(collected)
    }
}
