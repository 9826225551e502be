//! Conditional retry executor
//!
//! [`PollClient`] sends a request and, when a condition is configured, keeps
//! re-sending it until the condition holds or the deadline passes.
//!
//! ## Behaviour
//! - Without a condition exactly one attempt is made.
//! - With a condition the transport is wrapped in a [`ReplayTransport`] and
//!   the deadline instant is fixed before the first attempt.
//! - The poll ticker only starts after the first failed check, so a condition
//!   that holds straight away adds no latency.
//! - The deadline is checked between attempts only; an attempt in flight is
//!   allowed to finish.
//! - Transport failures, application errors (status > 299), body read
//!   failures and decode failures all end the call immediately.
//! - Timeouts of thirty years or more count as unbounded, and longer
//!   intervals are clamped to that horizon.

use std::time::Duration;

use indexpoll_domain::{PollError, Result, StatusError};
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::io::AsyncReadExt;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::options::RequestOptions;
use crate::response::{is_error_status, Response};
use crate::transport::{ReplayTransport, Request, Transport, TransportResponse};

/// Waits at or beyond this horizon are treated as unbounded.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Wraps a transport with condition-driven polling.
#[derive(Debug, Clone)]
pub struct PollClient<T> {
    transport: T,
}

impl<T: Transport> PollClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Execute `request`, polling until `options.condition` holds.
    ///
    /// # Errors
    /// Returns the first terminal error, or [`PollError::DeadlineExceeded`]
    /// when the condition never held within the timeout.
    #[instrument(skip_all, fields(conditional = options.condition.is_some()))]
    pub async fn execute<R>(&self, request: &mut R, options: &RequestOptions) -> Result<Response>
    where
        R: Request + ?Sized,
    {
        self.run::<R, IgnoredAny>(request, None, options).await
    }

    /// Like [`execute`](Self::execute), additionally decoding every
    /// successful response body into `out`.
    ///
    /// On return `out` holds the decoded body of the returned response.
    #[instrument(skip_all, fields(conditional = options.condition.is_some()))]
    pub async fn execute_into<R, O>(
        &self,
        request: &mut R,
        out: &mut O,
        options: &RequestOptions,
    ) -> Result<Response>
    where
        R: Request + ?Sized,
        O: DeserializeOwned,
    {
        self.run(request, Some(out), options).await
    }

    async fn run<R, O>(
        &self,
        request: &mut R,
        mut out: Option<&mut O>,
        options: &RequestOptions,
    ) -> Result<Response>
    where
        R: Request + ?Sized,
        O: DeserializeOwned,
    {
        options.validate()?;

        let replay;
        let transport: &dyn Transport = if options.condition.is_some() {
            replay = ReplayTransport::new(&self.transport);
            &replay
        } else {
            &self.transport
        };

        let deadline = options
            .condition
            .as_ref()
            .and(options.timeout)
            .filter(|timeout| *timeout < FAR_FUTURE)
            .and_then(|timeout| Instant::now().checked_add(timeout));
        let never = CancellationToken::new();
        let cancel = options.cancellation.as_ref().unwrap_or(&never);

        let mut ticker: Option<Interval> = None;
        let mut attempts: u32 = 0;

        loop {
            if let Some(ticker) = ticker.as_mut() {
                tokio::select! {
                    biased;
                    () = wait_until(deadline) => {
                        warn!(attempts, timeout = ?options.timeout, "poll deadline exceeded");
                        return Err(PollError::DeadlineExceeded {
                            timeout: options.timeout.unwrap_or_default(),
                            attempts,
                        });
                    }
                    () = cancel.cancelled() => {
                        warn!(attempts, "polling cancelled");
                        return Err(PollError::Cancelled);
                    }
                    _ = ticker.tick() => {}
                }
            }

            attempts += 1;
            let response = attempt(request, transport, cancel).await.map_err(|err| {
                debug!(attempt = attempts, error = %err, kind = err.label(), "attempt failed");
                err
            })?;
            debug!(attempt = attempts, status = response.status(), "attempt completed");

            if let Some(out) = out.as_deref_mut() {
                *out = serde_json::from_slice(response.body())?;
            }

            match &options.condition {
                None => return Ok(response),
                Some(condition) if condition.evaluate(&response) => {
                    debug!(attempts, "condition satisfied");
                    return Ok(response);
                }
                Some(_) => trace!(attempt = attempts, "condition not yet satisfied"),
            }

            if ticker.is_none() {
                let period = options.interval.min(FAR_FUTURE);
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker = Some(interval);
            }
        }
    }
}

/// Send once and drain the body into a snapshot.
///
/// `cancel` is honoured while the body streams in as well.
async fn attempt<R>(
    request: &mut R,
    transport: &dyn Transport,
    cancel: &CancellationToken,
) -> Result<Response>
where
    R: Request + ?Sized,
{
    let TransportResponse { status, headers, mut body } = request.send(transport, cancel).await?;

    let mut buf = Vec::new();
    tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(PollError::Cancelled),
        read = body.read_to_end(&mut buf) => {
            read.map_err(PollError::ResponseBody)?;
        }
    }

    if is_error_status(status) {
        let message = String::from_utf8_lossy(&buf).into_owned();
        return Err(StatusError::new(status, message).into());
    }

    Ok(Response::new(status, headers, buf))
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
