//! HTTP Response.
//!
//! [`ResponseWriter`] writes a response directly into a transport, enforcing the message order:
//!
//! ```text
//! status line -> headers -> body | chunk* -> last chunk -> trailers
//! ```
//!
//! A call made out of order fails with [`WriteError::OrderViolation`] and writes nothing.
use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::headers::HeaderMap;
use crate::http::StatusCode;

mod error;
pub mod write;


pub use error::WriteError;
pub use write::default_headers;

/// Response writing progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriterState {
    #[default]
    AwaitingStatusLine,
    AwaitingHeaders,
    AwaitingBody,
    AwaitingTrailers,
    Closed,
}

impl std::fmt::Display for WriterState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Self::AwaitingStatusLine => "awaiting status line",
            Self::AwaitingHeaders => "awaiting headers",
            Self::AwaitingBody => "awaiting body",
            Self::AwaitingTrailers => "awaiting trailers",
            Self::Closed => "closed",
        })
    }
}

/// Body framing, fixed by the first body write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Framing {
    Fixed,
    Chunked,
}

/// HTTP Response writer.
pub struct ResponseWriter<IO> {
    io: IO,
    write_buffer: BytesMut,
    state: WriterState,
    framing: Option<Framing>,
    /// Lowercase names listed by the `trailer` header.
    trailers: Vec<String>,
}

impl<IO> ResponseWriter<IO> {
    /// Create new [`ResponseWriter`] awaiting the status line.
    pub fn new(io: IO) -> Self {
        Self {
            io,
            write_buffer: BytesMut::with_capacity(256),
            state: WriterState::AwaitingStatusLine,
            framing: None,
            trailers: Vec::new(),
        }
    }

    /// Returns current writer state.
    #[inline]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Returns shared reference to the underlying transport.
    #[inline]
    pub fn get_ref(&self) -> &IO {
        &self.io
    }

    /// Consume the writer, returning the underlying transport.
    #[inline]
    pub fn into_inner(self) -> IO {
        self.io
    }

    fn check_state(&self, state: WriterState, operation: &'static str) -> Result<(), WriteError> {
        if self.state == state {
            Ok(())
        } else {
            Err(WriteError::OrderViolation { operation, state: self.state })
        }
    }

    /// Like [`check_state`][Self::check_state] for [`WriterState::AwaitingBody`], also rejecting
    /// a body write whose framing differs from the previous ones.
    fn check_body(&self, framing: Framing, operation: &'static str) -> Result<(), WriteError> {
        self.check_state(WriterState::AwaitingBody, operation)?;
        match self.framing {
            Some(current) if current != framing => {
                Err(WriteError::OrderViolation { operation, state: self.state })
            }
            _ => Ok(()),
        }
    }
}

impl<IO> ResponseWriter<IO>
where
    IO: AsyncWrite + Unpin,
{
    /// Write `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: impl Into<StatusCode>) -> Result<(), WriteError> {
        self.check_state(WriterState::AwaitingStatusLine, "write status line")?;
        write::status_line(status.into(), &mut self.write_buffer);
        self.send().await?;
        self.state = WriterState::AwaitingHeaders;
        Ok(())
    }

    /// Write the header block, including the terminating blank line.
    ///
    /// Field names listed by a `trailer` header are the only ones accepted by
    /// [`write_trailers`][ResponseWriter::write_trailers].
    pub async fn write_headers(&mut self, headers: &HeaderMap) -> Result<(), WriteError> {
        self.check_state(WriterState::AwaitingHeaders, "write headers")?;
        write::header_block(headers, &mut self.write_buffer);
        self.send().await?;

        if let Some(declared) = headers.get("trailer") {
            self.trailers = declared
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_ascii_lowercase)
                .collect();
        }

        self.state = WriterState::AwaitingBody;
        Ok(())
    }

    /// Write raw body bytes, returns the number of bytes written.
    ///
    /// Can be called multiple times, but not after a chunk has been written.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.check_body(Framing::Fixed, "write body")?;
        self.framing = Some(Framing::Fixed);
        if let Err(err) = self.io.write_all(body).await {
            return Err(self.fail(err));
        }
        Ok(body.len())
    }

    /// Write a single chunk, returns the number of data bytes written.
    ///
    /// An empty `data` writes a zero size chunk, which the peer reads as the end of the body.
    /// Use [`write_chunked_body_done`][ResponseWriter::write_chunked_body_done] instead.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.check_body(Framing::Chunked, "write chunked body")?;
        self.framing = Some(Framing::Chunked);
        write::chunk(data, &mut self.write_buffer);
        self.send().await?;
        Ok(data.len())
    }

    /// Write the last chunk, `0\r\n`.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.check_body(Framing::Chunked, "write chunked body done")?;
        self.framing = Some(Framing::Chunked);
        write::chunk_terminator(&mut self.write_buffer);
        self.send().await?;
        self.state = WriterState::AwaitingTrailers;
        Ok(())
    }

    /// Write the trailer section, completing the response.
    ///
    /// Every field must be declared by the `trailer` header, otherwise
    /// [`WriteError::UndeclaredTrailer`] is returned and nothing is written.
    pub async fn write_trailers(&mut self, trailers: &HeaderMap) -> Result<(), WriteError> {
        self.check_state(WriterState::AwaitingTrailers, "write trailers")?;

        for (name, _) in trailers {
            if !self.trailers.iter().any(|declared| declared == name) {
                return Err(WriteError::UndeclaredTrailer(name.to_owned()));
            }
        }

        write::header_block(trailers, &mut self.write_buffer);
        self.send().await?;
        self.flush().await?;
        self.state = WriterState::Closed;
        Ok(())
    }

    /// Complete the response and flush the transport.
    ///
    /// After the last chunk, an empty trailer section is written. A chunked body must be
    /// terminated with [`write_chunked_body_done`][ResponseWriter::write_chunked_body_done]
    /// first. Calling `finish` on a closed writer does nothing.
    pub async fn finish(&mut self) -> Result<(), WriteError> {
        match self.state {
            WriterState::Closed => return Ok(()),
            WriterState::AwaitingBody => {
                if self.framing == Some(Framing::Chunked) {
                    return Err(WriteError::OrderViolation {
                        operation: "finish",
                        state: self.state,
                    });
                }
            }
            WriterState::AwaitingTrailers => {
                self.write_buffer.extend_from_slice(b"\r\n");
                self.send().await?;
            }
            state @ (WriterState::AwaitingStatusLine | WriterState::AwaitingHeaders) => {
                return Err(WriteError::OrderViolation { operation: "finish", state });
            }
        }

        self.flush().await?;
        self.state = WriterState::Closed;
        Ok(())
    }

    async fn send(&mut self) -> Result<(), WriteError> {
        if let Err(err) = self.io.write_all_buf(&mut self.write_buffer).await {
            return Err(self.fail(err));
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), WriteError> {
        if let Err(err) = self.io.flush().await {
            return Err(self.fail(err));
        }
        Ok(())
    }

    fn fail(&mut self, err: std::io::Error) -> WriteError {
        self.write_buffer.clear();
        self.state = WriterState::Closed;
        WriteError::Transport(err)
    }
}

impl<IO> std::fmt::Debug for ResponseWriter<IO> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("state", &self.state)
            .field("framing", &self.framing)
            .field("trailers", &self.trailers)
            .finish_non_exhaustive()
    }
}
