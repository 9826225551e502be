//! Port interfaces for sending requests
//!
//! The core never speaks HTTP itself. Implementations live in
//! `indexpoll-infra` or in test doubles.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use indexpoll_domain::Result;
use serde::Serialize;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// One-shot readable byte stream.
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// One-shot outgoing body stream.
pub type StreamingBody = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Request method understood by every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing request body.
pub enum RequestBody {
    /// Bytes already in memory; cheap to clone.
    Buffered(Bytes),
    /// A stream that can be read exactly once.
    Streaming(StreamingBody),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Buffered(bytes)
    }
}

/// Transport-agnostic description of a single call.
///
/// Transports take the body out of `body` while sending it, which leaves the
/// field empty afterwards. Everything else stays untouched.
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), headers: Vec::new(), body: None }
    }

    /// Append a query-string parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bytes_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Buffered(body.into()));
        self
    }

    /// Serialize `value` as the JSON body and set the content type.
    pub fn json_body<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(value)?;
        Ok(self.header("Content-Type", "application/json").bytes_body(encoded))
    }

    /// Use a one-shot reader as the body.
    pub fn reader_body<R>(mut self, reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        self.body = Some(RequestBody::Streaming(Box::new(reader)));
        self
    }
}

/// Raw result of one transport call, before the body has been read.
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: BodyReader,
}

impl TransportResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: BodyReader) -> Self {
        Self { status, headers, body }
    }

    /// Response whose body is served from memory.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, Vec::new(), Box::new(std::io::Cursor::new(body.into())))
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The underlying wire client.
///
/// Implementations must honour `cancel` for the duration of the call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &mut TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(
        &self,
        request: &mut TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        (**self).send(request, cancel).await
    }
}

/// Operation that can be executed against a transport, possibly many times.
#[async_trait]
pub trait Request: Send {
    async fn send(
        &mut self,
        transport: &dyn Transport,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse>;
}

#[async_trait]
impl Request for TransportRequest {
    async fn send(
        &mut self,
        transport: &dyn Transport,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        transport.send(self, cancel).await
    }
}
