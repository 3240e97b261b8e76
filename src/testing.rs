//! In-process HTTP stub used by the client tests.
//!
//! Serves a fixed sequence of canned replies over a real TCP socket, one
//! connection per reply, and records every request it sees so tests can
//! assert on paths, headers and bodies.

#![allow(
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_docs_in_private_items,
    reason = "test-only helper where a loud panic is the right failure mode"
)]

extern crate alloc;

use alloc::sync::Arc;
use core::net::SocketAddr;
use std::sync::Mutex;

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::{TcpListener, TcpStream};

/// One canned HTTP response.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    /// A JSON reply with the given status code.
    pub(crate) fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body: body.to_string(),
        }
    }

    /// A reply whose body is not valid JSON.
    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_owned(),
        }
    }

    /// Attaches an extra response header.
    #[must_use]
    pub(crate) fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

/// What the stub saw in a single request.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) authorization: Option<String>,
    pub(crate) body: String,
}

/// Stub server handing out canned replies in order, one per connection.
#[derive(Debug)]
pub(crate) struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Binds a local listener and starts answering with `replies` in order.
    pub(crate) async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let _server = tokio::spawn(async move {
            for reply in replies {
                let Ok((mut stream, _peer)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                recorded.lock().expect("record request").push(request);
                let response = render_response(&reply);
                if stream.write_all(response.as_bytes()).await.is_err() {
                    return;
                }
                let _closed = stream.shutdown().await;
            }
        });
        Self { addr, requests }
    }

    /// Base URL for pointing a client at the stub.
    pub(crate) fn url(&self) -> String {
        format!("http://{}/v1/", self.addr)
    }

    /// Copies out every request recorded so far, in arrival order.
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("read recorded requests").clone()
    }
}

/// Reads one HTTP/1.1 request, honouring `Content-Length` for the body.
async fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut raw = Vec::new();
    let mut chunk = [0_u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("read request head");
        assert!(read > 0, "connection closed before the headers completed");
        raw.extend_from_slice(&chunk[..read]);
        if let Some(position) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().expect("request line");
    let mut parts = request_line.split(' ');
    let method = parts.next().expect("request method").to_owned();
    let target = parts.next().expect("request target").to_owned();

    let mut authorization = None;
    let mut content_length = 0_usize;
    for line in lines {
        if let Some(value) = header_value(line, "authorization") {
            authorization = Some(value);
        }
        if let Some(value) = header_value(line, "content-length") {
            content_length = value.parse().expect("content-length value");
        }
    }

    let mut body = raw.split_off(header_end);
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.expect("read request body");
        assert!(read > 0, "connection closed before the body completed");
        body.extend_from_slice(&chunk[..read]);
    }

    RecordedRequest {
        method,
        target,
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

fn header_value(line: &str, name: &str) -> Option<String> {
    let (header, value) = line.split_once(':')?;
    header
        .eq_ignore_ascii_case(name)
        .then(|| value.trim().to_owned())
}

fn render_response(reply: &Reply) -> String {
    let mut lines = vec![format!("HTTP/1.1 {} Stub", reply.status)];
    for header in &reply.headers {
        lines.push(format!("{}: {}", header.0, header.1));
    }
    lines.push(format!("Content-Length: {}", reply.body.len()));
    lines.push("Connection: close".to_owned());
    lines.push(String::new());
    lines.push(reply.body.clone());
    lines.join("\r\n")
}
