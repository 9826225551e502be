//! Response snapshots
//!
//! The executor drains each transport response into a [`Response`]. The body
//! is held as one owned buffer and every call to [`Response::reader`] hands
//! out a fresh, unconsumed view of it, so conditions, the executor and the
//! caller can all read the same bytes.

use std::io::Cursor;

use bytes::Bytes;
use indexpoll_domain::constants::MAX_SUCCESS_STATUS;
use indexpoll_domain::Result;
use serde::de::DeserializeOwned;

/// Fully-read result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status marks an application-level error.
    pub fn is_error(&self) -> bool {
        is_error_status(self.status)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A new readable stream positioned at the start of the body.
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.body.clone())
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub(crate) fn is_error_status(status: u16) -> bool {
    status > MAX_SUCCESS_STATUS
}
