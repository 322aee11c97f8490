//! Server runtime.
//!
//! One request is served per connection, each connection runs in its own task.
use std::{io, net::SocketAddr, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};

use crate::{
    http::StatusCode,
    log::{debug, error, info, warning},
    request::{DEFAULT_BUFFER_CAP, ReadBuffer, ReadError, Request, read_request_with},
    response::{ResponseWriter, WriteError, WriterState, default_headers},
};

#[cfg(test)]
mod test;

// ===== Handler =====

/// Application request handler.
///
/// Called once per completed request. The handler is expected to write a complete response,
/// if it fails before writing a status line, the runtime responds with `500`.
pub trait Handler: Send + Sync + 'static {
    fn call<IO>(
        &self,
        request: Request,
        response: &mut ResponseWriter<IO>,
    ) -> impl Future<Output = Result<(), WriteError>> + Send
    where
        IO: AsyncWrite + Unpin + Send;
}

// ===== Config =====

/// Runtime configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Initial capacity of the per connection read buffer.
    pub read_buffer_capacity: usize,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self { read_buffer_capacity: DEFAULT_BUFFER_CAP }
    }
}

// ===== Connection =====

/// An error that can occur while serving a connection.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to read the request.
    Read(ReadError),
    /// Failed to write the response, or the handler failed.
    Write(WriteError),
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Write(err) => Some(err),
        }
    }
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read request: {err}"),
            Self::Write(err) => write!(f, "failed to write response: {err}"),
        }
    }
}

impl From<ReadError> for ConnectionError {
    #[inline]
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl From<WriteError> for ConnectionError {
    #[inline]
    fn from(value: WriteError) -> Self {
        Self::Write(value)
    }
}

/// Serve a single request on `io`.
///
/// A malformed or incomplete request is answered with `400`, a transport failure closes the
/// connection without a response. The read error is returned after the best-effort response,
/// a failure to write that response is only logged.
pub async fn serve_connection<IO, H>(
    mut io: IO,
    handler: &H,
    config: &Config,
) -> Result<(), ConnectionError>
where
    IO: AsyncRead + AsyncWrite + Unpin + Send,
    H: Handler,
{
    let mut buffer = ReadBuffer::with_capacity(config.read_buffer_capacity);
    let request = read_request_with(&mut io, &mut buffer).await;
    let mut response = ResponseWriter::new(io);

    let request = match request {
        Ok(ok) => ok,
        Err(err @ ReadError::Transport(_)) => return Err(err.into()),
        Err(err) => {
            warning!("failed to parse request: {err}");
            let body = format!("error parsing request: {err}");
            if let Err(write_err) =
                respond(&mut response, StatusCode::BAD_REQUEST, body.as_bytes()).await
            {
                error!("failed to write bad request response: {write_err}");
            }
            return Err(err.into());
        }
    };

    let result = handler.call(request, &mut response).await;

    if response.state() == WriterState::AwaitingStatusLine {
        if let Err(err) = &result {
            error!("handler failed: {err}");
        } else {
            error!("handler did not write a response");
        }
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        respond(&mut response, status, status.reason().as_bytes()).await?;
    }

    let finished = response.finish().await;
    result?;
    finished?;
    Ok(())
}

/// Write a complete response with the default headers.
async fn respond<IO>(
    response: &mut ResponseWriter<IO>,
    status: StatusCode,
    body: &[u8],
) -> Result<(), WriteError>
where
    IO: AsyncWrite + Unpin,
{
    response.write_status_line(status).await?;
    response.write_headers(&default_headers(body.len())).await?;
    response.write_body(body).await?;
    response.finish().await
}

// ===== Server =====

/// Start server with given [`Handler`], accepting connections forever.
pub async fn serve<H: Handler>(listener: TcpListener, handler: H) {
    Server::new(listener, handler).run().await
}

/// TCP server.
#[derive(Debug)]
pub struct Server<H> {
    listener: TcpListener,
    handler: Arc<H>,
    config: Config,
}

impl<H: Handler> Server<H> {
    /// Create new [`Server`] with the default [`Config`].
    pub fn new(listener: TcpListener, handler: H) -> Self {
        Self::with_config(listener, handler, Config::default())
    }

    /// Create new [`Server`] with given [`Config`].
    pub fn with_config(listener: TcpListener, handler: H, config: Config) -> Self {
        Self { listener, handler: Arc::new(handler), config }
    }

    /// Bind a TCP listener on `addr`.
    pub async fn bind(addr: impl tokio::net::ToSocketAddrs, handler: H) -> io::Result<Self> {
        Ok(Self::new(TcpListener::bind(addr).await?, handler))
    }

    /// Returns the local address the server is listening on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Connections already accepted keep running in their own task.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        if let Ok(addr) = self.listener.local_addr() {
            info!("listening on {addr}");
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((io, addr)) => {
                        debug!("accepted connection from {addr}");
                        let handler = Arc::clone(&self.handler);
                        let config = self.config;
                        tokio::spawn(async move {
                            if let Err(err) = serve_connection(io, &*handler, &config).await {
                                error!("{addr}: {err}");
                            }
                        });
                    }
                    Err(err) => {
                        error!("failed to accept connection: {err}");
                    }
                },
            }
        }

        info!("server stopped");
    }
}
