//! Per-call execution options
//!
//! Options are assembled with [`RequestOptionsBuilder`]; a later setter
//! overrides an earlier one for the same field. Once built, the value is
//! read-only for the duration of the call.

use std::time::Duration;

use indexpoll_domain::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use indexpoll_domain::{PollError, PollSettings, Result};
use tokio_util::sync::CancellationToken;

use crate::condition::Condition;

/// Options controlling how a request is polled.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Overall deadline for conditional polling. `None` polls until the
    /// condition holds.
    pub timeout: Option<Duration>,
    /// Spacing between attempts after the first failed check.
    pub interval: Duration,
    /// Stop condition. Without one, exactly one attempt is made.
    pub condition: Option<Condition>,
    /// External cancellation signal.
    pub cancellation: Option<CancellationToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_POLL_TIMEOUT),
            interval: DEFAULT_POLL_INTERVAL,
            condition: None,
            cancellation: None,
        }
    }
}

impl RequestOptions {
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::new()
    }

    /// Defaults plus `condition`.
    pub fn with_condition(condition: Condition) -> Self {
        Self { condition: Some(condition), ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(PollError::Config("poll interval must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`RequestOptions`] with fluent API
#[derive(Debug, Default)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from configured poll settings instead of the built-in defaults.
    pub fn from_settings(settings: &PollSettings) -> Self {
        Self::new().settings(settings)
    }

    /// Apply timeout and interval from `settings`.
    pub fn settings(mut self, settings: &PollSettings) -> Self {
        self.options.timeout = settings.timeout();
        self.options.interval = settings.interval();
        self
    }

    /// Set the polling deadline. A zero duration disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.options.timeout = None;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.options.condition = Some(condition);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.options.cancellation = Some(token);
        self
    }

    pub fn build(self) -> Result<RequestOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
