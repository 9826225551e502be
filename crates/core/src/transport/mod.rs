//! Transport ports and the body-replay wrapper

pub mod ports;
pub mod replay;

pub use ports::{
    BodyReader, Method, Request, RequestBody, StreamingBody, Transport, TransportRequest,
    TransportResponse,
};
pub use replay::ReplayTransport;
