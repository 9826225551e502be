//! Tracing subscriber setup
//!
//! `RUST_LOG` overrides the default level, e.g.
//! `RUST_LOG=indexpoll_core=trace,indexpoll_infra=debug`.

use indexpoll_domain::{PollError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install a human-readable subscriber writing to stderr.
///
/// See [`init_tracing_with`].
pub fn init_tracing(default_level: &str) -> Result<bool> {
    init_tracing_with(LogFormat::Pretty, default_level)
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, so repeated
/// calls from tests are harmless.
///
/// # Errors
/// Returns `PollError::Config` if `default_level` is not a valid filter
/// directive.
pub fn init_tracing_with(format: LogFormat, default_level: &str) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).map_err(|e| {
            PollError::Config(format!("Invalid log filter '{default_level}': {e}"))
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init()
            .is_ok(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_current_span(true))
            .try_init()
            .is_ok(),
    };

    Ok(installed)
}
