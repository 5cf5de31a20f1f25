//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// the run summary.
pub fn init(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // a second init (e.g. in tests) keeps the first subscriber
    if json {
        builder.json().try_init().ok();
    } else {
        builder.with_target(false).try_init().ok();
    }
}
