//! Minimal HTTP stub for exercising clients against canned replies.
//!
//! Available to other crates' tests through the `test-util` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned reply for one `METHOD /path` route.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.into(),
        }
    }

    pub fn event_stream(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream",
            body: body.into(),
        }
    }
}

/// A request seen by the stub.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub route: String,
    pub body: String,
}

/// A localhost server answering canned replies and recording what it saw.
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    /// Serve `routes` (keyed by e.g. `"GET /health"`) until the test ends.
    /// Unknown routes answer 404.
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        Self::start_on(0, routes).await
    }

    /// Like [`StubServer::start`], on a fixed localhost port.
    pub async fn start_on(port: u16, routes: Vec<(&str, Reply)>) -> Self {
        let routes: HashMap<String, Reply> = routes
            .into_iter()
            .map(|(route, reply)| (route.to_string(), reply))
            .collect();
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    handle(stream, &routes, &seen).await;
                });
            }
        });

        Self {
            url: format!("http://127.0.0.1:{}", port),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Body of the first request that hit `route`, parsed as JSON.
    pub fn body_of(&self, route: &str) -> serde_json::Value {
        let recorded = self
            .requests()
            .into_iter()
            .find(|r| r.route == route)
            .unwrap_or_else(|| panic!("no request to {}", route));
        serde_json::from_str(&recorded.body).unwrap()
    }
}

/// A localhost URL on which nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn handle(mut stream: TcpStream, routes: &HashMap<String, Reply>, seen: &Mutex<Vec<Recorded>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let route = format!(
        "{} {}",
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default()
    );
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    seen.lock().unwrap().push(Recorded {
        route: route.clone(),
        body,
    });

    let reply = routes
        .get(&route)
        .cloned()
        .unwrap_or_else(|| Reply::json(404, r#"{"error":"not found"}"#));

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.content_type,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
