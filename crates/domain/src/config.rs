//! Configuration structures
//!
//! `SyncConfig` is the single explicit value object handed to every component
//! at construction. Nothing below the config loader reads the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_SHEET_NAME,
    DEFAULT_WRITE_BATCH_SIZE, MAX_WRITE_BATCH_SIZE,
};
use crate::errors::{Result, RosterSyncError};
use crate::impl_option_conversions;

/// How identifiers repeated across pages are exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Every occurrence becomes its own row.
    #[default]
    AppendAll,
    /// Keep the first occurrence of each identifier.
    DedupeById,
}

impl_option_conversions!(DuplicatePolicy {
    AppendAll => "append_all",
    DedupeById => "dedupe_by_id",
});

/// What ends pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTermination {
    /// Stop on the first empty page.
    #[default]
    EmptyPage,
    /// Also stop after a page shorter than the page size.
    ShortPage,
}

impl_option_conversions!(PageTermination {
    EmptyPage => "empty_page",
    ShortPage => "short_page",
});

/// Writer retry settings for rate-limited batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per batch, including the first.
    pub max_attempts: u32,
    pub delay_ms: u64,
    /// Double the delay after every rate-limited attempt, capped at
    /// `max_delay_ms`.
    pub exponential: bool,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
            exponential: false,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

/// Configuration for a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Roster API base URL, e.g. `https://roster.example.com/api/`
    pub base_url: String,
    /// Username registered and logged in against the roster API
    pub principal: String,
    /// Spreadsheet identifier of the destination
    pub destination_id: String,
    /// Service-account key file for the destination
    pub credential_path: PathBuf,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub termination: PageTermination,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_batch_size() -> usize {
    DEFAULT_WRITE_BATCH_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SyncConfig {
    /// Build a config with every tunable at its default.
    pub fn new(
        base_url: impl Into<String>,
        principal: impl Into<String>,
        destination_id: impl Into<String>,
        credential_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            principal: principal.into(),
            destination_id: destination_id.into(),
            credential_path: credential_path.into(),
            sheet_name: default_sheet_name(),
            page_size: default_page_size(),
            batch_size: default_batch_size(),
            retry: RetrySettings::default(),
            duplicates: DuplicatePolicy::default(),
            termination: PageTermination::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Check required fields and numeric bounds.
    ///
    /// # Errors
    /// Returns `RosterSyncError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("base_url", self.base_url.as_str()),
            ("principal", self.principal.as_str()),
            ("destination_id", self.destination_id.as_str()),
            ("sheet_name", self.sheet_name.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RosterSyncError::Config(format!("{field} must not be empty")));
        }
        if self.credential_path.as_os_str().is_empty() {
            return Err(RosterSyncError::Config("credential_path must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(RosterSyncError::Config("page_size must be greater than zero".into()));
        }
        if !(1..=MAX_WRITE_BATCH_SIZE).contains(&self.batch_size) {
            return Err(RosterSyncError::Config(format!(
                "batch_size must be between 1 and {MAX_WRITE_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(RosterSyncError::Config("retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SyncConfig {
        SyncConfig::new("https://roster.example.com/", "exporter", "sheet-123", "creds.json")
    }

    #[test]
    fn defaults_match_export_contract() {
        let config = config();
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_ms, 5000);
        assert!(!config.retry.exponential);
        assert_eq!(config.duplicates, DuplicatePolicy::AppendAll);
        assert_eq!(config.termination, PageTermination::EmptyPage);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut config = config();
        config.principal = "  ".into();
        let err = config.validate().unwrap_err();
        assert_eq!(err, RosterSyncError::Config("principal must not be empty".into()));
    }

    #[test]
    fn rejects_out_of_range_batch_size() {
        let mut config = config();
        config.batch_size = 1001;
        assert!(matches!(config.validate(), Err(RosterSyncError::Config(_))));

        config.batch_size = 0;
        assert!(matches!(config.validate(), Err(RosterSyncError::Config(_))));
    }

    #[test]
    fn rejects_zero_page_size_and_attempts() {
        let mut config = config();
        config.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = self::config();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults_from_toml() {
        let parsed: SyncConfig = toml::from_str(
            r#"
base_url = "https://roster.example.com/"
principal = "exporter"
destination_id = "sheet-123"
credential_path = "creds.json"
duplicates = "dedupe_by_id"

[retry]
max_attempts = 3
"#,
        )
        .unwrap();

        assert_eq!(parsed.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(parsed.duplicates, DuplicatePolicy::DedupeById);
        assert_eq!(parsed.retry.max_attempts, 3);
        assert_eq!(parsed.retry.delay_ms, DEFAULT_RETRY_DELAY_MS);
    }
}
