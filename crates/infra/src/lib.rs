//! # IndexPoll Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest-backed [`HttpTransport`]
//! - Conversions from client errors into `PollError`
//! - Configuration loading from environment and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `indexpoll-core`
//! - Depends on `indexpoll-domain` and `indexpoll-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

use indexpoll_core::PollClient;
use indexpoll_domain::{Config, Result};

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder};
pub use observability::{init_tracing, init_tracing_with, LogFormat};

/// Build a polling client for the service described by `config`.
///
/// Poll defaults are not applied here; derive per-call options with
/// `RequestOptionsBuilder::from_settings(&config.poll)`.
///
/// # Errors
/// Returns `PollError::Config` if the base URL is invalid or the HTTP client
/// cannot be constructed.
pub fn connect(config: &Config) -> Result<PollClient<HttpTransport>> {
    let transport = HttpTransport::from_config(&config.client)?;
    tracing::debug!(url = %transport.base_url(), "connected transport");
    Ok(PollClient::new(transport))
}
