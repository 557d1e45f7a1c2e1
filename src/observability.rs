//! Structured logging for the analyzer.
//!
//! Controlled by the `RUST_LOG` environment variable with a default of
//! `warn`: phase-level progress at `info`, per-function detail at `debug`.
//! Logs go to stderr so they never mix with the report on stdout.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed; call once at
/// process startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
