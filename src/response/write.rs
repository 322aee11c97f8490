//! Response serialization.
//!
//! Functions here only format bytes into a [`BufMut`], ordering is enforced by
//! [`ResponseWriter`][super::ResponseWriter].
use bytes::BufMut;

use crate::headers::HeaderMap;
use crate::http::{StatusCode, VERSION};

const CRLF: &[u8; 2] = b"\r\n";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Write `HTTP/1.1 <code> <reason>\r\n`.
///
/// Unknown status codes are written with an empty reason.
///
/// ```rust
/// use wirehttp::{http::StatusCode, response::write};
///
/// let mut buf = Vec::new();
/// write::status_line(StatusCode::OK, &mut buf);
/// assert_eq!(buf, b"HTTP/1.1 200 OK\r\n");
/// ```
pub fn status_line<B: BufMut>(status: StatusCode, mut buf: B) {
    let mut code = itoa::Buffer::new();
    buf.put_slice(VERSION.as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(code.format(status.as_u16()).as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(status.reason().as_bytes());
    buf.put_slice(CRLF);
}

/// Write every header as `name: value\r\n` followed by the terminating blank line.
pub fn header_block<B: BufMut>(headers: &HeaderMap, mut buf: B) {
    for (name, value) in headers {
        buf.put_slice(name.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(CRLF);
    }
    buf.put_slice(CRLF);
}

/// Write a single chunk: uppercase hex length, `\r\n`, `data`, `\r\n`.
pub fn chunk<B: BufMut>(data: &[u8], mut buf: B) {
    put_hex(data.len(), &mut buf);
    buf.put_slice(CRLF);
    buf.put_slice(data);
    buf.put_slice(CRLF);
}

/// Write the last chunk, `0\r\n`.
///
/// The trailer section, or an empty line, must follow.
pub fn chunk_terminator<B: BufMut>(mut buf: B) {
    buf.put_slice(b"0\r\n");
}

fn put_hex<B: BufMut>(mut value: usize, buf: &mut B) {
    let mut digits = [0u8; usize::BITS as usize / 4];
    let mut at = digits.len();
    loop {
        at -= 1;
        digits[at] = HEX_DIGITS[value & 0xF];
        value >>= 4;
        if value == 0 {
            break;
        }
    }
    buf.put_slice(&digits[at..]);
}

/// Returns the default response headers for a body of `content_length` bytes.
///
/// ```text
/// content-length: <content_length>
/// connection: close
/// content-type: text/html
/// ```
pub fn default_headers(content_length: usize) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);
    headers.append_field(
        "content-length".to_owned(),
        itoa::Buffer::new().format(content_length),
    );
    headers.append_field("connection".to_owned(), "close");
    headers.append_field("content-type".to_owned(), "text/html");
    headers
}
