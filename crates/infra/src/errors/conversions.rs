//! Conversions from external infrastructure errors into domain errors.

use indexpoll_domain::PollError;
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PollError);

impl From<InfraError> for PollError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PollError> for InfraError {
    fn from(value: PollError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PollError */
/* -------------------------------------------------------------------------- */

/// The client error is kept whole so callers can downcast it.
impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(PollError::transport(value))
    }
}

/// Short classification of a client failure for log fields.
pub fn error_kind(err: &HttpError) -> &'static str {
    if err.is_timeout() {
        return "timeout";
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return "connect";
    }

    if err.is_builder() || err.is_request() {
        "request"
    } else if err.is_body() {
        "body"
    } else if err.is_decode() {
        "decode"
    } else {
        "other"
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → PollError */
/* -------------------------------------------------------------------------- */

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(PollError::Config(format!("invalid URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
