use std::io;

use crate::headers::HeaderError;

// ===== Parsing Error =====

/// HTTP request parsing error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Request line is not exactly three space separated parts.
    MalformedRequestLine,
    /// Method is not an uppercase token.
    InvalidMethod,
    /// Protocol version is not `HTTP/1.1`.
    UnsupportedVersion,
    /// Header line have no `:` separator.
    InvalidHeader,
    /// Header name is empty or followed by whitespace.
    InvalidFieldName,
    /// Header name contains invalid character.
    InvalidFieldNameCharacter(u8),
    /// `content-length` is not a non-negative integer.
    InvalidContentLength,
    /// Body is longer than `content-length`.
    BodyOverflow,
    /// Request is already complete.
    AlreadyComplete,
}

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MalformedRequestLine => f.write_str("malformed request line"),
            Self::InvalidMethod => f.write_str("invalid method"),
            Self::UnsupportedVersion => f.write_str("unsupported version"),
            Self::InvalidHeader => f.write_str("invalid header"),
            Self::InvalidFieldName => f.write_str("invalid field name"),
            Self::InvalidFieldNameCharacter(byte) => {
                write!(f, "invalid character in field name: '{}'", byte.escape_ascii())
            }
            Self::InvalidContentLength => f.write_str("invalid content length"),
            Self::BodyOverflow => f.write_str("body is larger than content length"),
            Self::AlreadyComplete => f.write_str("request is already complete"),
        }
    }
}

impl From<HeaderError> for ParseError {
    fn from(value: HeaderError) -> Self {
        match value {
            HeaderError::InvalidFieldName => Self::InvalidFieldName,
            HeaderError::InvalidFieldNameCharacter(byte) => Self::InvalidFieldNameCharacter(byte),
            HeaderError::InvalidHeader | HeaderError::InvalidFieldValue => Self::InvalidHeader,
        }
    }
}

// ===== Read Error =====

/// An error that can occur while reading a request from a transport.
#[derive(Debug)]
pub enum ReadError {
    /// The request is malformed.
    Parse(ParseError),
    /// The stream ended before the request was complete.
    IncompleteRequest,
    /// The transport failed.
    Transport(io::Error),
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::IncompleteRequest => None,
            Self::Transport(err) => Some(err),
        }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Parse(err) => err.fmt(f),
            Self::IncompleteRequest => f.write_str("incomplete request"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

impl From<ParseError> for ReadError {
    #[inline]
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<io::Error> for ReadError {
    #[inline]
    fn from(value: io::Error) -> Self {
        Self::Transport(value)
    }
}
