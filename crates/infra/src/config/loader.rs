//! Configuration loader
//!
//! Loads the sync configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If a required variable is missing, falls back to loading from file;
//!    a malformed optional variable is an error, not a fallback
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `ROSTERSYNC_API_URL`: Roster API base URL (required)
//! - `ROSTERSYNC_PRINCIPAL`: Username to register and log in (required)
//! - `ROSTERSYNC_SPREADSHEET_ID`: Destination spreadsheet id (required)
//! - `ROSTERSYNC_CREDENTIALS_PATH`: Service-account key file (required)
//! - `ROSTERSYNC_SHEET_NAME`: Destination sheet title (default `Sheet1`)
//! - `ROSTERSYNC_PAGE_SIZE`: Records per source page (default 1000)
//! - `ROSTERSYNC_BATCH_SIZE`: Rows per write request (default 1000)
//! - `ROSTERSYNC_DEDUPE`: Drop repeated identifiers (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./rostersync.{json,toml}` then `./config.{json,toml}` (current
//!    working directory)
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rostersync_domain::config::DuplicatePolicy;
use rostersync_domain::{Result, RosterSyncError, SyncConfig};

use crate::roster::normalize_base_url;

const REQUIRED_ENV_VARS: [&str; 4] = [
    "ROSTERSYNC_API_URL",
    "ROSTERSYNC_PRINCIPAL",
    "ROSTERSYNC_SPREADSHEET_ID",
    "ROSTERSYNC_CREDENTIALS_PATH",
];

const CONFIG_FILE_NAMES: [&str; 4] =
    ["rostersync.json", "rostersync.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// An explicit `path` always wins. Otherwise the environment is used when
/// every required variable is set, and its errors are returned as is; a
/// malformed optional variable never sends the loader to a config file.
/// With any required variable missing, the first probed config file is
/// loaded instead.
///
/// # Errors
/// Returns `RosterSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or out of range
pub fn load(path: Option<PathBuf>) -> Result<SyncConfig> {
    if path.is_some() {
        return load_from_file(path);
    }

    if let Some(missing) = REQUIRED_ENV_VARS.iter().find(|key| optional_env_var(key).is_none()) {
        tracing::debug!(missing = *missing, "Environment incomplete, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `RosterSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<SyncConfig> {
    let mut config = SyncConfig::new(
        env_var("ROSTERSYNC_API_URL")?,
        env_var("ROSTERSYNC_PRINCIPAL")?,
        env_var("ROSTERSYNC_SPREADSHEET_ID")?,
        env_var("ROSTERSYNC_CREDENTIALS_PATH")?,
    );

    if let Some(sheet_name) = optional_env_var("ROSTERSYNC_SHEET_NAME") {
        config.sheet_name = sheet_name;
    }
    if let Some(page_size) = env_parse::<u32>("ROSTERSYNC_PAGE_SIZE")? {
        config.page_size = page_size;
    }
    if let Some(batch_size) = env_parse::<usize>("ROSTERSYNC_BATCH_SIZE")? {
        config.batch_size = batch_size;
    }
    if env_bool("ROSTERSYNC_DEDUPE", false) {
        config.duplicates = DuplicatePolicy::DedupeById;
    }

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `RosterSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<SyncConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RosterSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RosterSyncError::Config(
                "No configuration in the environment and no config file found in any of the \
                 standard locations"
                    .to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RosterSyncError::Config(format!("Failed to read config file: {}", e)))?;

    validate(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `RosterSyncError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<SyncConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RosterSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RosterSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(RosterSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Field checks plus a base URL that parses
fn validate(config: SyncConfig) -> Result<SyncConfig> {
    config.validate()?;
    normalize_base_url(&config.base_url)
        .map_err(|e| RosterSyncError::Config(format!("Invalid base_url: {}", e)))?;
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory and up to two parents
/// 2. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    candidates_in(&roots).into_iter().find(|path| path.exists())
}

fn candidates_in(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `RosterSyncError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    optional_env_var(key).ok_or_else(|| {
        RosterSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| RosterSyncError::Config(format!("Invalid {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
