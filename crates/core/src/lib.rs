//! # IndexPoll Core
//!
//! Condition-driven polling against an eventually-consistent search service.
//!
//! This crate contains:
//! - Response conditions and their combinators
//! - Per-call request options
//! - Transport and request ports, plus the body-replay wrapper
//! - The retry executor, [`PollClient`]
//!
//! ## Architecture Principles
//! - Only depends on `indexpoll-domain`
//! - No HTTP or platform code; transports are supplied via traits
//! - Only "request succeeded but condition not yet true" is retried

pub mod condition;
pub mod executor;
pub mod options;
pub mod requests;
pub mod response;
pub mod transport;

pub use condition::{all_condition, status_is, Condition};
pub use executor::PollClient;
pub use options::{RequestOptions, RequestOptionsBuilder};
pub use response::Response;
pub use transport::{
    BodyReader, Method, ReplayTransport, Request, RequestBody, StreamingBody, Transport,
    TransportRequest, TransportResponse,
};
