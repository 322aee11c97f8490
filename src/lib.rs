//! Incremental HTTP/1.1 request parser and response writer over async byte streams.
//!
//! - [`request`]: feed bytes into a [`Request`] until it is complete, or let
//!   [`read_request`][request::read_request] drive the reads.
//! - [`response`]: write a response in order with [`ResponseWriter`], including chunked body and
//!   trailers.
//! - [`rt`]: one request per connection TCP server.
#![warn(missing_debug_implementations)]

mod log;
mod matches;

pub mod http;
pub mod headers;
pub mod chunked;
pub mod request;
pub mod response;
pub mod rt;

pub use http::StatusCode;
pub use headers::HeaderMap;
pub use request::Request;
pub use response::ResponseWriter;
