//! Configuration loader
//!
//! Loads client and polling configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `INDEXPOLL_URL` is unset or a value is invalid, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `INDEXPOLL_URL`: Search service base URL (required)
//! - `INDEXPOLL_USERNAME` / `INDEXPOLL_PASSWORD`: Basic auth credentials
//! - `INDEXPOLL_API_KEY`: API key, preferred over basic auth
//! - `INDEXPOLL_REQUEST_TIMEOUT_MS`: Per-request HTTP timeout
//! - `INDEXPOLL_POLL_TIMEOUT_MS`: Default polling deadline (`0` = unbounded)
//! - `INDEXPOLL_POLL_INTERVAL_MS`: Default spacing between attempts
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./indexpoll.{json,toml}` then `./config.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexpoll_domain::{ClientConfig, Config, PollError, PollSettings, Result};

const FILE_NAMES: [&str; 4] = ["indexpoll.json", "indexpoll.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `PollError::Config` if neither the environment nor any config
/// file yields a valid configuration.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!(
                url = %config.client.url,
                "Configuration loaded from environment variables"
            );
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `INDEXPOLL_URL` is required; unset optional variables keep their
/// defaults.
///
/// # Errors
/// Returns `PollError::Config` if `INDEXPOLL_URL` is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let client = ClientConfig {
        url: env_var("INDEXPOLL_URL")?,
        request_timeout_ms: env_parse("INDEXPOLL_REQUEST_TIMEOUT_MS")?
            .unwrap_or(defaults.client.request_timeout_ms),
        username: env_opt("INDEXPOLL_USERNAME"),
        password: env_opt("INDEXPOLL_PASSWORD"),
        api_key: env_opt("INDEXPOLL_API_KEY"),
        user_agent: defaults.client.user_agent,
    };

    let poll = PollSettings {
        timeout_ms: env_parse("INDEXPOLL_POLL_TIMEOUT_MS")?.unwrap_or(defaults.poll.timeout_ms),
        interval_ms: env_parse("INDEXPOLL_POLL_INTERVAL_MS")?.unwrap_or(defaults.poll.interval_ms),
    };

    Ok(Config { client, poll })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`]. The format follows the file extension.
///
/// # Errors
/// Returns `PollError::Config` if the file is missing, unreadable or does
/// not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PollError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PollError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PollError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, choosing the format from the extension of `path`.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PollError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PollError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PollError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Candidate files in `dir` and up to two of its ancestors, nearest first.
fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .take(3)
        .flat_map(|base| FILE_NAMES.iter().map(move |name| base.join(name)))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `PollError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PollError::Config(format!("Missing required environment variable: {}", key)))
}

/// Optional variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| PollError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
