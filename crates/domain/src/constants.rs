//! Polling constants
//!
//! Defaults applied when the caller does not override them.

use std::time::Duration;

/// Upper bound on how long a conditional request keeps polling.
///
/// Set high enough to absorb cluster and index/shard initialisation; under
/// normal conditions it should never be reached.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Spacing between attempts once the first condition check has failed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout applied to each individual HTTP call by the infra transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_USER_AGENT: &str = concat!("indexpoll/", env!("CARGO_PKG_VERSION"));

/// Status codes above this value are application errors.
pub const MAX_SUCCESS_STATUS: u16 = 299;
