//! In-process HTTP mocks for tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request as received by the mock server.
pub struct Captured {
    /// Request line and headers.
    pub head: String,
    /// Body, de-chunked when sent with chunked transfer encoding.
    pub body: Vec<u8>,
}

impl Captured {
    /// Returns the value of `name` (case-insensitive), if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Starts a one-shot mock HTTP server that answers with `status` and `body`
/// after reading the whole request, which the handle resolves to.
pub async fn mock_server(status: u16, body: &str) -> (String, JoinHandle<Captured>) {
    let (url, listener) = bind().await;
    let body = body.to_string();

    let handle = tokio::spawn(async move { respond(&listener, status, &body).await });

    (url, handle)
}

/// Like [`mock_server`], but serves one connection per response, in order.
pub async fn mock_server_sequence(
    responses: &[(u16, &str)],
) -> (String, JoinHandle<Vec<Captured>>) {
    let (url, listener) = bind().await;
    let responses: Vec<(u16, String)> = responses
        .iter()
        .map(|(status, body)| (*status, body.to_string()))
        .collect();

    let handle = tokio::spawn(async move {
        let mut captured = Vec::with_capacity(responses.len());
        for (status, body) in &responses {
            captured.push(respond(&listener, *status, body).await);
        }
        captured
    });

    (url, handle)
}

async fn bind() -> (String, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (format!("http://127.0.0.1:{port}"), listener)
}

async fn respond(listener: &TcpListener, status: u16, body: &str) -> Captured {
    let (mut stream, _) = listener.accept().await.unwrap();
    let captured = read_request(&mut stream).await;

    let resp = format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(resp.as_bytes()).await;
    let _ = stream.shutdown().await;
    captured
}

/// Returns a local port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).trim_end().to_string();
    let mut captured = Captured {
        head,
        body: Vec::new(),
    };

    let chunked = captured
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));
    let content_length = captured
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok());

    let mut body = buf.split_off(head_end);
    if chunked {
        while !body.ends_with(b"0\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed inside chunked body");
            body.extend_from_slice(&chunk[..n]);
        }
        captured.body = dechunk(&body);
    } else {
        let expected = content_length.unwrap_or(0);
        while body.len() < expected {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed inside body");
            body.extend_from_slice(&chunk[..n]);
        }
        captured.body = body;
    }

    captured
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let line_end = find(raw, b"\r\n").unwrap();
        let size_field = String::from_utf8_lossy(&raw[..line_end]);
        let size_hex = size_field.split(';').next().unwrap().trim();
        let size = usize::from_str_radix(size_hex, 16).unwrap();
        raw = &raw[line_end + 2..];
        if size == 0 {
            return out;
        }
        out.extend_from_slice(&raw[..size]);
        raw = &raw[size + 2..];
    }
}
