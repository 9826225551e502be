//! Shared helpers for HTTP integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use indexpoll_domain::Config;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Serves `replies` in order and repeats the last one once exhausted.
#[derive(Clone)]
pub struct Sequence {
    replies: Arc<Vec<ResponseTemplate>>,
    calls: Arc<AtomicUsize>,
}

impl Sequence {
    pub fn new(replies: Vec<ResponseTemplate>) -> Self {
        assert!(!replies.is_empty(), "a sequence needs at least one reply");
        Self { replies: Arc::new(replies), calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies[call.min(self.replies.len() - 1)].clone()
    }
}

/// Search response reporting `total` hits.
pub fn hits(total: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "took": 1,
        "timed_out": false,
        "hits": { "total": { "value": total, "relation": "eq" }, "hits": [] }
    }))
}

/// Client configuration pointing at the mock server.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.client.url = server.uri();
    config
}
