//! Body-replaying transport wrapper
//!
//! A [`TransportRequest`] body may be a one-shot stream, and the underlying
//! transport consumes it on send. [`ReplayTransport`] captures the bytes on
//! the first send and reinstalls an identical buffered body before every
//! send, so one logical request can go over the wire many times.

use std::sync::OnceLock;

use async_trait::async_trait;
use bytes::Bytes;
use indexpoll_domain::{PollError, Result};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::ports::{RequestBody, Transport, TransportRequest, TransportResponse};

/// Wraps a transport so the request body survives repeated sends.
///
/// Scoped to a single logical request: the first body seen is the one
/// replayed forever after.
pub struct ReplayTransport<'a, T: Transport + ?Sized> {
    inner: &'a T,
    captured: OnceLock<Option<Bytes>>,
}

impl<'a, T: Transport + ?Sized> ReplayTransport<'a, T> {
    pub fn new(inner: &'a T) -> Self {
        Self { inner, captured: OnceLock::new() }
    }

    /// Bytes captured on the first send, if any were.
    pub fn captured(&self) -> Option<&Bytes> {
        self.captured.get().and_then(Option::as_ref)
    }

    async fn capture(&self, request: &mut TransportRequest) -> Result<Option<Bytes>> {
        if let Some(captured) = self.captured.get() {
            return Ok(captured.clone());
        }

        let bytes = match request.body.take() {
            None => None,
            Some(RequestBody::Buffered(bytes)) => Some(bytes),
            Some(RequestBody::Streaming(mut reader)) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await.map_err(PollError::BodyCapture)?;
                Some(Bytes::from(buf))
            }
        };
        trace!(len = bytes.as_ref().map_or(0, Bytes::len), "captured request body");

        // Attempts are sequential, so nothing else can have won the race.
        Ok(self.captured.get_or_init(|| bytes).clone())
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for ReplayTransport<'_, T> {
    async fn send(
        &self,
        request: &mut TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        let body = self.capture(request).await?;
        request.body = body.map(RequestBody::Buffered);
        self.inner.send(request, cancel).await
    }
}
