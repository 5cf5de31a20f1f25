//! Wiring of adapters into the sync service

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rostersync_core::{
    ProgressObserver, RetryPolicy, StatusEnricher, SyncOptions, SyncService, TabularWriter,
};
use rostersync_domain::SyncConfig;
use rostersync_infra::{
    GoogleSheetsStore, HttpClient, RosterApiClient, ServiceAccountTokenProvider,
};

pub fn build_service(
    config: &SyncConfig,
    observer: Arc<dyn ProgressObserver>,
) -> Result<SyncService> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let roster_http =
        HttpClient::builder().timeout(timeout).build().context("building roster HTTP client")?;
    // single attempt for data calls: the writer owns batch retries
    let sheets_http =
        GoogleSheetsStore::http_client(timeout).context("building spreadsheet HTTP client")?;
    let token_http = ServiceAccountTokenProvider::http_client(timeout)
        .context("building token exchange HTTP client")?;

    let roster = Arc::new(
        RosterApiClient::new(roster_http, &config.base_url).context("invalid roster API URL")?,
    );

    let tokens = ServiceAccountTokenProvider::from_key_file(token_http, &config.credential_path)
        .with_context(|| {
            format!("loading service-account key from {}", config.credential_path.display())
        })?;
    let store = GoogleSheetsStore::new(
        sheets_http,
        Arc::new(tokens),
        config.destination_id.clone(),
        config.sheet_name.clone(),
    )?;

    let writer = TabularWriter::new(Arc::new(store))
        .with_retry_policy(RetryPolicy::from(&config.retry))
        .with_batch_size(config.batch_size)
        .with_observer(observer);

    Ok(SyncService::new(
        roster.clone(),
        roster.clone(),
        StatusEnricher::new(roster),
        writer,
        SyncOptions::from(config),
    ))
}
