//! Minimal HTTP listener for exercising the web service clients offline

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// One request as the listener saw it
#[derive(Debug)]
pub struct ReceivedRequest {
    pub line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub received: Instant,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Answers `requests` connections with the same canned reply, one at a time
pub struct TestServer {
    pub url: String,
    handle: JoinHandle<Vec<ReceivedRequest>>,
}

impl TestServer {
    pub fn start(status: u16, body: &str, requests: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = thread::spawn(move || {
            (0..requests)
                .map(|_| {
                    let (mut stream, _) = listener.accept().unwrap();
                    let received = Instant::now();
                    let mut reader = BufReader::new(stream.try_clone().unwrap());

                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();

                    let mut headers = Vec::new();
                    loop {
                        let mut header = String::new();
                        reader.read_line(&mut header).unwrap();
                        let header = header.trim_end();
                        if header.is_empty() {
                            break;
                        }
                        if let Some((name, value)) = header.split_once(':') {
                            headers.push((name.trim().to_string(), value.trim().to_string()));
                        }
                    }

                    let length = headers
                        .iter()
                        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, v)| v.parse().ok())
                        .unwrap_or(0);
                    let mut raw = vec![0; length];
                    reader.read_exact(&mut raw).unwrap();

                    write!(
                        stream,
                        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    )
                    .unwrap();
                    stream.flush().unwrap();

                    ReceivedRequest {
                        line: line.trim_end().to_string(),
                        headers,
                        body: String::from_utf8(raw).unwrap(),
                        received,
                    }
                })
                .collect()
        });

        Self { url, handle }
    }

    /// Wait for every expected request and return them in arrival order
    pub fn finish(self) -> Vec<ReceivedRequest> {
        self.handle.join().unwrap()
    }
}

/// An address nothing listens on
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}
