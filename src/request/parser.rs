use super::{ParseError, ParseState, Request, RequestLine};
use crate::{http::VERSION, matches};

impl Request {
    /// Feed bytes into the parser.
    ///
    /// Advances as far as possible with the given bytes and returns the number of bytes consumed.
    /// `Ok(0)` means more bytes are required, the unconsumed bytes must be fed again along with
    /// the next read.
    ///
    /// While awaiting the body, all given bytes are consumed. Bytes beyond `content-length` are
    /// rejected with [`ParseError::BodyOverflow`].
    ///
    /// ```rust
    /// use wirehttp::request::{ParseState, Request};
    ///
    /// let mut req = Request::new();
    /// assert_eq!(req.feed(b"GET / HTTP/1.1\r\nHo").unwrap(), 16);
    /// assert_eq!(req.state(), ParseState::AwaitingHeaders);
    ///
    /// assert_eq!(req.feed(b"Host: localhost\r\n\r\n").unwrap(), 19);
    /// assert!(req.is_done());
    /// assert_eq!(req.headers().get("host"), Some("localhost"));
    /// ```
    pub fn feed(&mut self, bytes: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParseState::Done {
            return Err(ParseError::AlreadyComplete);
        }

        let mut read = 0;

        while self.state != ParseState::Done {
            let n = self.parse_single(&bytes[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }

        Ok(read)
    }

    fn parse_single(&mut self, bytes: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::AwaitingRequestLine => {
                let Some((line, read)) = parse_request_line(bytes)? else {
                    return Ok(0);
                };
                self.line = line;
                self.state = ParseState::AwaitingHeaders;
                Ok(read)
            }
            ParseState::AwaitingHeaders => {
                let (read, done) = self.headers.parse(bytes)?;
                if done {
                    self.state = ParseState::AwaitingBody;
                }
                Ok(read)
            }
            ParseState::AwaitingBody => {
                let Some(len) = self.content_length()? else {
                    self.state = ParseState::Done;
                    return Ok(0);
                };

                if self.body.len() + bytes.len() > len {
                    return Err(ParseError::BodyOverflow);
                }

                self.body.extend_from_slice(bytes);
                if self.body.len() == len {
                    self.state = ParseState::Done;
                }
                Ok(bytes.len())
            }
            ParseState::Done => Err(ParseError::AlreadyComplete),
        }
    }
}

// ===== Request Line =====

/// Parse request line, returns the line and the number of bytes consumed including the crlf.
///
/// Returns `None` if no crlf is found.
fn parse_request_line(bytes: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(end) = matches::find_crlf(bytes) else {
        return Ok(None);
    };

    let Ok(line) = std::str::from_utf8(&bytes[..end]) else {
        return Err(ParseError::MalformedRequestLine);
    };

    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::MalformedRequestLine);
    };

    if method.is_empty() || !method.bytes().all(matches::is_method) {
        return Err(ParseError::InvalidMethod);
    }

    if version != VERSION {
        return Err(ParseError::UnsupportedVersion);
    }

    let line = RequestLine {
        method: method.to_owned(),
        target: target.to_owned(),
        version: version["HTTP/".len()..].to_owned(),
    };

    Ok(Some((line, end + 2)))
}
