use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf},
    net::{TcpListener, TcpStream},
};

use super::{Config, ConnectionError, Handler, Server, serve_connection};
use crate::{
    http::StatusCode,
    request::{ParseError, ReadError, Request},
    response::{ResponseWriter, WriteError, default_headers},
};

/// Responds with the method and target, `/fail` and `/silent` write nothing.
struct Echo;

impl Handler for Echo {
    async fn call<IO>(
        &self,
        request: Request,
        response: &mut ResponseWriter<IO>,
    ) -> Result<(), WriteError>
    where
        IO: AsyncWrite + Unpin + Send,
    {
        match request.target() {
            "/fail" => Err(WriteError::Transport(io::Error::other("handler failed"))),
            "/silent" => Ok(()),
            _ => {
                let body = format!("{} {} {}", request.method(), request.target(), request.body().len());
                response.write_status_line(StatusCode::OK).await?;
                response.write_headers(&default_headers(body.len())).await?;
                response.write_body(body.as_bytes()).await?;
                Ok(())
            }
        }
    }
}

async fn exchange(input: &[u8]) -> (Result<(), ConnectionError>, String) {
    let (mut client, server) = tokio::io::duplex(4096);
    let config = Config::default();

    tokio::join!(
        serve_connection(server, &Echo, &config),
        async {
            client.write_all(input).await.unwrap();
            client.shutdown().await.unwrap();
            let mut output = String::new();
            client.read_to_string(&mut output).await.unwrap();
            output
        },
    )
}

#[tokio::test]
async fn test_serve_connection() {
    let (result, output) = exchange(b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").await;
    result.unwrap();
    assert_eq!(
        output,
        "HTTP/1.1 200 OK\r\n\
        content-length: 14\r\n\
        connection: close\r\n\
        content-type: text/html\r\n\
        \r\n\
        POST /submit 5"
    );
}

#[tokio::test]
async fn test_bad_request() {
    macro_rules! test {
        ($input:literal => $err:pat, $body:literal) => {
            let (result, output) = exchange($input).await;
            assert!(matches!(result, Err(ConnectionError::Read($err))), "{result:?}");
            assert!(output.starts_with("HTTP/1.1 400 BAD REQUEST\r\n"), "{output}");
            assert!(output.ends_with(concat!("\r\n\r\nerror parsing request: ", $body)), "{output}");
        };
    }

    test!(b"GET / HTTP/1.0\r\n\r\n" => ReadError::Parse(_), "unsupported version");
    test!(b"get / HTTP/1.1\r\n\r\n" => ReadError::Parse(_), "invalid method");
    test!(b"GET /\r\n\r\n" => ReadError::Parse(_), "malformed request line");
    test!(b"GET / HTTP/1.1\r\nHost : x\r\n\r\n" => ReadError::Parse(_), "invalid field name");
    test!(b"GET / HTTP/1.1\r\nHost: x\r\n" => ReadError::IncompleteRequest, "incomplete request");
    test!(b"" => ReadError::IncompleteRequest, "incomplete request");
}

/// Yields its input, then end of stream; every write fails.
struct HalfClosed<'a>(&'a [u8]);

impl AsyncRead for HalfClosed<'_> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let bytes = self.0;
        let (head, rest) = bytes.split_at(bytes.len().min(buf.remaining()));
        buf.put_slice(head);
        self.0 = rest;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for HalfClosed<'_> {
    fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_bad_request_write_failure() {
    // the read error is reported even when the 400 cannot be written
    let io = HalfClosed(b"get / HTTP/1.1\r\n\r\n");
    let result = serve_connection(io, &Echo, &Config::default()).await;
    assert!(
        matches!(result, Err(ConnectionError::Read(ReadError::Parse(ParseError::InvalidMethod)))),
        "{result:?}"
    );

    let io = HalfClosed(b"GET / HTTP/1.1\r\n");
    let result = serve_connection(io, &Echo, &Config::default()).await;
    assert!(matches!(result, Err(ConnectionError::Read(ReadError::IncompleteRequest))), "{result:?}");
}

#[tokio::test]
async fn test_handler_error() {
    let (result, output) = exchange(b"GET /fail HTTP/1.1\r\n\r\n").await;
    assert!(matches!(result, Err(ConnectionError::Write(WriteError::Transport(_)))));
    assert!(output.starts_with("HTTP/1.1 500 INTERNAL SERVER ERROR\r\n"));
    assert!(output.ends_with("\r\n\r\nINTERNAL SERVER ERROR"));

    let (result, output) = exchange(b"GET /silent HTTP/1.1\r\n\r\n").await;
    result.unwrap();
    assert!(output.starts_with("HTTP/1.1 500 INTERNAL SERVER ERROR\r\n"));
}

#[tokio::test]
async fn test_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::new(listener, Echo);
    let addr = server.local_addr().unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));

    for target in ["/a", "/b"] {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut output = String::new();
        stream.read_to_string(&mut output).await.unwrap();
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"), "{output}");
        assert!(output.ends_with(&format!("GET {target} 0")), "{output}");
    }

    tx.send(()).unwrap();
    task.await.unwrap();
}
