//! HTTP Protocol.
mod status;

pub use status::StatusCode;

/// The only protocol version spoken on the wire.
pub const VERSION: &str = "HTTP/1.1";
