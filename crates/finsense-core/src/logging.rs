//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Env var controlling log verbosity (standard env-filter syntax).
pub const LOG_ENV: &str = "FINSENSE_LOG";

/// Initializes tracing output to stderr. Quiet by default; set
/// `FINSENSE_LOG=debug` to see request-level logging. Token values are
/// never logged.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
