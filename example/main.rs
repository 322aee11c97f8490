use sha2::{Digest, Sha256};
use std::{env, io};
use tokio::{io::AsyncWrite, runtime::Runtime};
use wirehttp::{
    HeaderMap, Request, ResponseWriter, StatusCode,
    response::{WriteError, default_headers},
    rt::{Handler, Server},
};

const DEFAULT_ADDR: &str = "0.0.0.0:42069";

const MAX_STREAM_LINES: usize = 1024;

fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let addr = env::var("ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());

    Runtime::new()?.block_on(async {
        let server = Server::bind(&*addr, Pages).await?;
        server
            .run_until(async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    log::error!("failed to listen for ctrl-c: {err}");
                }
            })
            .await;
        Ok(())
    })
}

struct Pages;

impl Handler for Pages {
    async fn call<IO>(
        &self,
        request: Request,
        response: &mut ResponseWriter<IO>,
    ) -> Result<(), WriteError>
    where
        IO: AsyncWrite + Unpin + Send,
    {
        log::debug!("{request}");

        let target = request.target().trim();
        if let Some(lines) = target.strip_prefix("/stream/") {
            return stream(lines, response).await;
        }

        match target {
            "/yourproblem" => page(response, StatusCode::BAD_REQUEST, BAD_REQUEST).await,
            "/myproblem" => page(response, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR).await,
            _ => page(response, StatusCode::OK, OK).await,
        }
    }
}

async fn page<IO>(
    response: &mut ResponseWriter<IO>,
    status: StatusCode,
    body: &str,
) -> Result<(), WriteError>
where
    IO: AsyncWrite + Unpin,
{
    response.write_status_line(status).await?;
    response.write_headers(&default_headers(body.len())).await?;
    response.write_body(body.as_bytes()).await?;
    Ok(())
}

/// Chunked body of `lines` lines, followed by `X-Content-SHA256` and `X-Content-Length`
/// trailers.
async fn stream<IO>(lines: &str, response: &mut ResponseWriter<IO>) -> Result<(), WriteError>
where
    IO: AsyncWrite + Unpin,
{
    let Ok(lines) = lines.parse::<usize>() else {
        return page(response, StatusCode::BAD_REQUEST, BAD_REQUEST).await;
    };

    let mut headers = HeaderMap::new();
    for (name, value) in [
        ("Transfer-Encoding", "chunked"),
        ("Content-Type", "text/plain"),
        ("Connection", "close"),
        ("Trailer", "X-Content-SHA256, X-Content-Length"),
    ] {
        headers.insert(name, value).expect("static header is valid");
    }

    response.write_status_line(StatusCode::OK).await?;
    response.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut length = 0;
    for i in 0..lines.min(MAX_STREAM_LINES) {
        let line = format!("{{\"line\": {i}}}\n");
        hasher.update(line.as_bytes());
        length += response.write_chunked_body(line.as_bytes()).await?;
    }
    response.write_chunked_body_done().await?;

    let hash: String = hasher.finalize().iter().map(|byte| format!("{byte:02x}")).collect();

    let mut trailers = HeaderMap::new();
    trailers.insert("X-Content-SHA256", hash).expect("hex digest is a valid value");
    trailers.insert("X-Content-Length", length.to_string()).expect("integer is a valid value");
    response.write_trailers(&trailers).await
}

const OK: &str = "<html>
<head>
<title>200 OK</title>
</head>
<body>
<h1>Success!</h1>
<p>Your request was an absolute banger.</p>
</body>
</html>";

const BAD_REQUEST: &str = "<html>
<head>
<title>400 Bad Request</title>
</head>
<body>
<h1>Bad Request</h1>
<p>Your request honestly kinda sucked.</p>
</body>
</html>";

const INTERNAL_SERVER_ERROR: &str = "<html>
<head>
<title>500 Internal Server Error</title>
</head>
<body>
<h1>Internal Server Error</h1>
<p>Okay, you know what? This one is on me.</p>
</body>
</html>";

#[cfg(test)]
mod test {
    use bytes::BytesMut;
    use sha2::{Digest, Sha256};
    use wirehttp::{ResponseWriter, chunked::ChunkedDecoder};

    use super::stream;

    #[tokio::test]
    async fn test_stream_trailers() {
        let mut res = ResponseWriter::new(Vec::new());
        stream("3", &mut res).await.unwrap();

        let output = res.get_ref();
        let head = output.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        assert!(output.starts_with(b"HTTP/1.1 200 OK\r\n"));

        let mut decoder = ChunkedDecoder::new();
        let mut body = BytesMut::new();
        assert_eq!(decoder.feed(&output[head..], &mut body), Ok(output.len() - head));
        assert!(decoder.is_done());
        assert_eq!(&body[..], b"{\"line\": 0}\n{\"line\": 1}\n{\"line\": 2}\n");

        let hash: String = Sha256::digest(&body[..]).iter().map(|byte| format!("{byte:02x}")).collect();
        let trailers = decoder.trailers();
        assert_eq!(trailers.len(), 2);
        assert_eq!(trailers.get("x-content-sha256"), Some(hash.as_str()));
        assert_eq!(trailers.get("x-content-length"), Some("36"));
    }

    #[tokio::test]
    async fn test_stream_invalid_count() {
        let mut res = ResponseWriter::new(Vec::new());
        stream("many", &mut res).await.unwrap();
        assert!(res.get_ref().starts_with(b"HTTP/1.1 400 BAD REQUEST\r\n"));
    }
}
