//! Request constructors for the read and administrative paths tests poll
//!
//! Each helper returns a plain [`TransportRequest`], which implements
//! [`Request`](crate::transport::Request) and can be polled directly.

use indexpoll_domain::Result;
use serde::Serialize;

use crate::transport::{Method, TransportRequest};

/// `POST /{index}/_search` with a JSON body.
pub fn search<B: Serialize + ?Sized>(index: &str, body: &B) -> Result<TransportRequest> {
    TransportRequest::new(Method::Post, format!("/{index}/_search")).json_body(body)
}

/// `POST /{index}/_count` with a JSON body.
pub fn count<B: Serialize + ?Sized>(index: &str, body: &B) -> Result<TransportRequest> {
    TransportRequest::new(Method::Post, format!("/{index}/_count")).json_body(body)
}

/// `GET /{index}/_doc/{id}`
pub fn get_document(index: &str, id: &str) -> TransportRequest {
    TransportRequest::new(Method::Get, format!("/{index}/_doc/{id}"))
}

/// `POST /{index}/_refresh`
pub fn refresh(index: &str) -> TransportRequest {
    TransportRequest::new(Method::Post, format!("/{index}/_refresh"))
}

/// `GET /_cluster/health`
pub fn cluster_health() -> TransportRequest {
    TransportRequest::new(Method::Get, "/_cluster/health")
}
