use tokio::io::AsyncRead;

use super::{ReadBuffer, ReadError, Request};
use crate::log::debug;

/// Read a single [`Request`] from `io`.
///
/// Reads until the request is complete. If the stream ends before that,
/// [`ReadError::IncompleteRequest`] is returned.
pub async fn read_request<IO>(io: &mut IO) -> Result<Request, ReadError>
where
    IO: AsyncRead + Unpin,
{
    read_request_with(io, &mut ReadBuffer::new()).await
}

/// Read a single [`Request`] from `io` using the given buffer.
///
/// Bytes already in `buffer` are parsed before reading from `io`. Bytes that are not part of
/// the request are left in `buffer`.
pub async fn read_request_with<IO>(io: &mut IO, buffer: &mut ReadBuffer) -> Result<Request, ReadError>
where
    IO: AsyncRead + Unpin,
{
    let mut request = Request::new();

    if !buffer.is_empty() {
        let read = request.feed(buffer.unconsumed())?;
        buffer.consume(read);
    }

    while !request.is_done() {
        let read = buffer.read_from(io).await?;
        if read == 0 {
            return Err(ReadError::IncompleteRequest);
        }

        let parsed = request.feed(buffer.unconsumed())?;
        buffer.consume(parsed);
    }

    debug!(
        "{} {} HTTP/{}, {} headers, {} bytes body",
        request.method(),
        request.target(),
        request.request_line().version,
        request.headers().len(),
        request.body().len(),
    );

    Ok(request)
}
