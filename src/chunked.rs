//! Chunked transfer coding decoder.
//!
//! The counterpart of [`ResponseWriter::write_chunked_body`][crate::response::ResponseWriter],
//! turning `<hex-length>\r\n<bytes>\r\n ... 0\r\n<trailers>\r\n` back into the message body.
use bytes::BytesMut;

use crate::headers::{HeaderError, HeaderMap};
use crate::matches;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Size,
    /// Remaining bytes of the current chunk.
    Data(usize),
    DataEnd,
    Trailers,
    Done,
}

/// Incremental chunked body decoder.
///
/// Like [`Request::feed`][crate::request::Request::feed], bytes that are not consumed must be
/// fed again along with the next read.
///
/// ```rust
/// use bytes::BytesMut;
/// use wirehttp::chunked::ChunkedDecoder;
///
/// let mut decoder = ChunkedDecoder::new();
/// let mut body = BytesMut::new();
///
/// let input = b"3\r\nfoo\r\n3\r\nbar\r\n0\r\n\r\n";
/// assert_eq!(decoder.feed(input, &mut body).unwrap(), input.len());
/// assert!(decoder.is_done());
/// assert_eq!(&body[..], b"foobar");
/// ```
#[derive(Clone, Debug)]
pub struct ChunkedDecoder {
    phase: Phase,
    trailers: HeaderMap,
}

impl Default for ChunkedDecoder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    /// Create new [`ChunkedDecoder`] awaiting the first chunk size.
    #[inline]
    pub const fn new() -> Self {
        Self { phase: Phase::Size, trailers: HeaderMap::new() }
    }

    /// Returns `true` if the last chunk and the trailer section have been decoded.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Returns the trailer fields received after the last chunk.
    #[inline]
    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    /// Decode `bytes`, appending chunk data into `body`.
    ///
    /// Returns the number of bytes consumed. Once done, nothing is consumed.
    pub fn feed(&mut self, bytes: &[u8], body: &mut BytesMut) -> Result<usize, ChunkedError> {
        let mut read = 0;

        while self.phase != Phase::Done {
            let n = self.decode_single(&bytes[read..], body)?;
            if n == 0 {
                break;
            }
            read += n;
        }

        Ok(read)
    }

    fn decode_single(&mut self, bytes: &[u8], body: &mut BytesMut) -> Result<usize, ChunkedError> {
        match self.phase {
            Phase::Size => {
                let Some(end) = matches::find_crlf(bytes) else {
                    return Ok(0);
                };

                // chunk extensions are ignored
                let line = &bytes[..end];
                let digits = match line.iter().position(|&b| b == b';') {
                    Some(ext) => &line[..ext],
                    None => line,
                };

                let size = parse_hex(digits.trim_ascii())?;
                self.phase = match size {
                    0 => Phase::Trailers,
                    n => Phase::Data(n),
                };
                Ok(end + 2)
            }
            Phase::Data(remaining) => {
                let len = remaining.min(bytes.len());
                body.extend_from_slice(&bytes[..len]);
                self.phase = match remaining - len {
                    0 => Phase::DataEnd,
                    n => Phase::Data(n),
                };
                Ok(len)
            }
            Phase::DataEnd => match bytes.first_chunk::<2>() {
                Some(b"\r\n") => {
                    self.phase = Phase::Size;
                    Ok(2)
                }
                Some(_) => Err(ChunkedError::InvalidChunkDelimiter),
                None => match bytes.first() {
                    Some(b'\r') | None => Ok(0),
                    Some(_) => Err(ChunkedError::InvalidChunkDelimiter),
                },
            },
            Phase::Trailers => {
                let (read, done) = self.trailers.parse(bytes)?;
                if done {
                    self.phase = Phase::Done;
                }
                Ok(read)
            }
            Phase::Done => Ok(0),
        }
    }
}

fn parse_hex(digits: &[u8]) -> Result<usize, ChunkedError> {
    if digits.is_empty() {
        return Err(ChunkedError::InvalidChunkSize);
    }

    let mut size = 0usize;
    for &byte in digits {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(ChunkedError::InvalidChunkSize),
        };
        size = size
            .checked_mul(16)
            .and_then(|size| size.checked_add(digit as usize))
            .ok_or(ChunkedError::InvalidChunkSize)?;
    }

    Ok(size)
}

// ===== Error =====

/// An error that can occur while decoding chunked body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkedError {
    /// Chunk size is not a hexadecimal number or is too large.
    InvalidChunkSize,
    /// Chunk data is not followed by `\r\n`.
    InvalidChunkDelimiter,
    /// Invalid trailer field.
    Header(HeaderError),
}

impl std::error::Error for ChunkedError {}

impl std::fmt::Display for ChunkedError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidChunkSize => f.write_str("invalid chunk size"),
            Self::InvalidChunkDelimiter => f.write_str("invalid chunk delimiter"),
            Self::Header(err) => write!(f, "invalid trailer: {err}"),
        }
    }
}

impl From<HeaderError> for ChunkedError {
    #[inline]
    fn from(value: HeaderError) -> Self {
        Self::Header(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode_bytewise(input: &[u8]) -> (ChunkedDecoder, BytesMut) {
        let mut decoder = ChunkedDecoder::new();
        let mut body = BytesMut::new();
        let mut pending = Vec::new();

        for &byte in input {
            pending.push(byte);
            let read = decoder.feed(&pending, &mut body).unwrap();
            pending.drain(..read);
        }

        assert!(pending.is_empty());
        (decoder, body)
    }

    #[test]
    fn test_decode() {
        macro_rules! test {
            (#[error($err:expr)] $input:literal) => {
                let mut decoder = ChunkedDecoder::new();
                assert_eq!(decoder.feed($input, &mut BytesMut::new()), Err($err));
            };
            ($input:literal => $body:literal) => {
                let (decoder, body) = decode_bytewise($input);
                assert!(decoder.is_done());
                assert_eq!(&body[..], $body);
            };
        }

        test!(b"3\r\nfoo\r\n3\r\nbar\r\n0\r\n\r\n" => b"foobar");
        test!(b"0\r\n\r\n" => b"");
        test!(b"A\r\n0123456789\r\n0\r\n\r\n" => b"0123456789");
        test!(b"a\r\n0123456789\r\n0\r\n\r\n" => b"0123456789");
        test!(b"4;name=value\r\nabcd\r\n0\r\n\r\n" => b"abcd");
        test!(b"2\r\n\r\n\r\n0\r\n\r\n" => b"\r\n");

        test!(#[error(ChunkedError::InvalidChunkSize)] b"\r\n");
        test!(#[error(ChunkedError::InvalidChunkSize)] b"xyz\r\n");
        test!(#[error(ChunkedError::InvalidChunkSize)] b"+3\r\nfoo\r\n");
        test!(#[error(ChunkedError::InvalidChunkSize)] b"FFFFFFFFFFFFFFFFFF\r\n");
        test!(#[error(ChunkedError::InvalidChunkDelimiter)] b"3\r\nfoobar\r\n");
        test!(#[error(ChunkedError::Header(HeaderError::InvalidHeader))] b"0\r\nbad trailer\r\n");
    }

    #[test]
    fn test_pending() {
        let mut decoder = ChunkedDecoder::new();
        let mut body = BytesMut::new();

        assert_eq!(decoder.feed(b"3", &mut body), Ok(0));
        assert_eq!(decoder.feed(b"3\r\nfo", &mut body), Ok(5));
        assert_eq!(&body[..], b"fo");
        assert_eq!(decoder.feed(b"o\r", &mut body), Ok(1));
        assert_eq!(decoder.feed(b"\r\n0\r\n", &mut body), Ok(5));
        assert!(!decoder.is_done());
        assert_eq!(decoder.feed(b"\r\n", &mut body), Ok(2));
        assert!(decoder.is_done());
        assert_eq!(decoder.feed(b"3\r\n", &mut body), Ok(0));
        assert_eq!(&body[..], b"foo");
    }

    #[test]
    fn test_trailers() {
        let input = b"5\r\nhello\r\n0\r\nX-Content-Length: 5\r\nX-Hash: abc\r\n\r\n";
        let (decoder, body) = decode_bytewise(input);

        assert!(decoder.is_done());
        assert_eq!(&body[..], b"hello");
        assert_eq!(decoder.trailers().len(), 2);
        assert_eq!(decoder.trailers().get("x-content-length"), Some("5"));
        assert_eq!(decoder.trailers().get("x-hash"), Some("abc"));
    }
}
