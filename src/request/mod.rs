//! HTTP Request.
//!
//! A [`Request`] is built incrementally by [`Request::feed`], which consumes as many bytes as
//! it can and reports how many were used. Unconsumed bytes must be submitted again together with
//! newly read bytes. [`read_request`] drives this loop over an async transport.
use bytes::BytesMut;

use crate::headers::HeaderMap;

mod buffer;
mod error;
mod parser;
mod reader;


pub use buffer::{DEFAULT_BUFFER_CAP, ReadBuffer};
pub use error::{ParseError, ReadError};
pub use reader::{read_request, read_request_with};

/// Request parsing progress.
///
/// States only move forward, [`Done`][ParseState::Done] is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseState {
    #[default]
    AwaitingRequestLine,
    AwaitingHeaders,
    AwaitingBody,
    Done,
}

/// HTTP Request Line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase method token, e.g: `GET`.
    pub method: String,
    /// Request target as sent by the client, not decoded.
    pub target: String,
    /// Protocol version without the `HTTP/` prefix, always `1.1`.
    pub version: String,
}

/// HTTP Request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    line: RequestLine,
    headers: HeaderMap,
    body: BytesMut,
    state: ParseState,
}

impl Request {
    /// Create new empty [`Request`] awaiting its request line.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns current parsing state.
    #[inline]
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Returns `true` if the whole message has been parsed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Returns the request line.
    ///
    /// Fields are empty until the request line is parsed.
    #[inline]
    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> &str {
        &self.line.method
    }

    /// Returns the request target.
    #[inline]
    pub fn target(&self) -> &str {
        &self.line.target
    }

    /// Returns shared reference to [`HeaderMap`].
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the message body received so far.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the parsed `content-length` header, or `None` if the header is absent.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        match self.headers.get("content-length") {
            Some(value) => match value.parse() {
                Ok(len) => Ok(Some(len)),
                Err(_) => Err(ParseError::InvalidContentLength),
            },
            None => Ok(None),
        }
    }

    /// Destruct request into request line, headers and body.
    #[inline]
    pub fn into_parts(self) -> (RequestLine, HeaderMap, BytesMut) {
        (self.line, self.headers, self.body)
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Request line:")?;
        writeln!(f, "- Method: {}", self.line.method)?;
        writeln!(f, "- Target: {}", self.line.target)?;
        writeln!(f, "- Version: {}", self.line.version)?;
        writeln!(f, "Headers:")?;
        for (name, value) in &self.headers {
            writeln!(f, "- {name}: {value}")?;
        }
        writeln!(f, "Body:")?;
        write!(f, "{}", String::from_utf8_lossy(&self.body))
    }
}
