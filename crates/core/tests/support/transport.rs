//! In-memory transport double
//!
//! Serves a scripted sequence of replies and records the body bytes each
//! attempt actually delivered, consuming bodies the way a real client does.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use indexpoll_core::{RequestBody, Transport, TransportRequest, TransportResponse};
use indexpoll_domain::{PollError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio_util::sync::CancellationToken;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    TransportFailure(String),
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Status(200, body.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status(status, body.into())
    }
}

#[derive(Default)]
struct State {
    script: VecDeque<Reply>,
    last: Option<Reply>,
    bodies: Vec<Option<Vec<u8>>>,
}

/// Cloneable handle; clones share the same script and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Replies are served in order; the last one repeats forever.
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let transport = Self::default();
        transport.state.lock().unwrap().script = replies.into_iter().collect();
        transport
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().bodies.len()
    }

    /// Body bytes received on each attempt, in order.
    pub fn bodies(&self) -> Vec<Option<Vec<u8>>> {
        self.state.lock().unwrap().bodies.clone()
    }

    fn next_reply(&self) -> Reply {
        let mut state = self.state.lock().unwrap();
        if let Some(reply) = state.script.pop_front() {
            state.last = Some(reply.clone());
            return reply;
        }
        state.last.clone().expect("mock transport has no scripted replies")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: &mut TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        let body = match request.body.take() {
            None => None,
            Some(RequestBody::Buffered(bytes)) => Some(bytes.to_vec()),
            Some(RequestBody::Streaming(mut reader)) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await.map_err(PollError::transport)?;
                Some(buf)
            }
        };
        self.state.lock().unwrap().bodies.push(body);

        match self.next_reply() {
            Reply::Status(status, body) => Ok(TransportResponse::from_bytes(status, body)),
            Reply::TransportFailure(message) => Err(PollError::transport(io::Error::new(
                io::ErrorKind::ConnectionReset,
                message,
            ))),
        }
    }
}

/// Request body whose first read fails.
pub struct BrokenBody;

impl AsyncRead for BrokenBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::UnexpectedEof, "upload aborted")))
    }
}
