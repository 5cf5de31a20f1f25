//! RosterSync command line entry point.
//!
//! # Usage
//!
//! ```text
//! rostersync [--config <path>] [--sheet-name <title>] [--page-size <n>]
//!            [--batch-size <n>] [--dedupe] [--json-logs] [--no-progress]
//! ```
//!
//! Configuration comes from the environment (after loading `.env`) or from a
//! JSON/TOML file; flags override individual values.

mod app;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rostersync_core::{ProgressObserver, TracingProgress};
use rostersync_domain::config::DuplicatePolicy;
use rostersync_domain::{SyncConfig, SyncReport};
use tracing::{error, info};

use crate::progress::BarProgress;

#[derive(Parser, Debug)]
#[command(
    name = "rostersync",
    version,
    about = "Export the client roster, enriched with live statuses, into a Google Sheet",
    long_about = None,
)]
struct Cli {
    /// Config file (JSON or TOML). Without it the environment is read first.
    #[arg(long, short, env = "ROSTERSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Destination sheet title
    #[arg(long)]
    sheet_name: Option<String>,

    /// Records requested per roster page
    #[arg(long)]
    page_size: Option<u32>,

    /// Rows per spreadsheet write (1-1000)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Keep only the first occurrence of each client id
    #[arg(long)]
    dedupe: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut SyncConfig) {
        if let Some(sheet_name) = &self.sheet_name {
            config.sheet_name = sheet_name.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.dedupe {
            config.duplicates = DuplicatePolicy::DedupeById;
        }
    }

    fn show_bar(&self) -> bool {
        !self.no_progress && !self.json_logs
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    match run(&cli).await {
        Ok(report) => {
            println!(
                "Exported {} rows from {} pages (rows {}-{})",
                report.write.rows_written,
                report.pages_fetched,
                report.write.first_row,
                report.write.next_row.saturating_sub(1),
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "sync failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<SyncReport> {
    let mut config =
        rostersync_infra::config::load(cli.config.clone()).context("loading configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    info!(
        principal = %config.principal,
        spreadsheet = %config.destination_id,
        sheet = %config.sheet_name,
        page_size = config.page_size,
        batch_size = config.batch_size,
        duplicates = %config.duplicates,
        "starting roster export"
    );

    let observer: Arc<dyn ProgressObserver> =
        if cli.show_bar() { Arc::new(BarProgress::new()) } else { Arc::new(TracingProgress) };

    let service = app::build_service(&config, observer)?;
    let report = service.run().await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::parse_from([
            "rostersync",
            "--sheet-name",
            "Clients",
            "--page-size",
            "200",
            "--batch-size",
            "400",
            "--dedupe",
        ]);
        let mut config =
            SyncConfig::new("https://roster.example.com/", "exporter", "sheet", "key.json");

        cli.apply_overrides(&mut config);

        assert_eq!(config.sheet_name, "Clients");
        assert_eq!(config.page_size, 200);
        assert_eq!(config.batch_size, 400);
        assert_eq!(config.duplicates, DuplicatePolicy::DedupeById);
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["rostersync"]);
        let mut config =
            SyncConfig::new("https://roster.example.com/", "exporter", "sheet", "key.json");
        let before = config.clone();

        cli.apply_overrides(&mut config);

        assert_eq!(config, before);
        assert!(cli.show_bar());
    }

    #[test]
    fn json_logs_hide_the_bar() {
        let cli = Cli::parse_from(["rostersync", "--json-logs"]);
        assert!(!cli.show_bar());
    }
}
