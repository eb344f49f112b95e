//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fieldlog::logger::{Level, Sink};
use fieldlog::reporter::{Event, Reporter};
use fieldlog::Fields;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Ordered record of collaborator calls across sink, reporter and exit.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Sink keeping every emission in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub lines: Mutex<Vec<(Level, String, Fields)>>,
    pub journal: Journal,
}

impl RecordingSink {
    pub fn new(journal: Journal) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            journal,
        }
    }

    pub fn last(&self) -> (Level, String, Fields) {
        self.lines.lock().unwrap().last().cloned().expect("no emission recorded")
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }
}

impl Sink for RecordingSink {
    fn emit(&self, level: Level, message: &str, fields: &Fields) {
        self.journal.push(format!("sink.emit:{level}"));
        self.lines.lock().unwrap().push((level, message.to_string(), fields.clone()));
    }

    fn flush(&self) {
        self.journal.push("sink.flush");
    }
}

/// Reporter keeping every event in memory.
pub struct RecordingReporter {
    pub events: Mutex<Vec<Event>>,
    pub levels: Vec<Level>,
    pub journal: Journal,
}

impl RecordingReporter {
    pub fn new(levels: Vec<Level>, journal: Journal) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            levels,
            journal,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn accepts(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    fn report(&self, event: Event) {
        self.journal.push("reporter.report");
        self.events.lock().unwrap().push(event);
    }

    fn flush(&self) {
        self.journal.push("reporter.flush");
    }
}

/// A request captured by the mock collector.
#[derive(Debug, Clone)]
pub struct Captured {
    pub request_line: String,
    pub headers: String,
    pub body: Value,
}

/// Start a mock error collector answering with `statuses` in order
/// (the last status repeats).
pub async fn start_collector(statuses: Vec<u16>) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let statuses = Arc::new(statuses);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    let calls = calls.clone();
                    let statuses = statuses.clone();
                    tokio::spawn(async move {
                        let Some(captured) = read_request(&mut socket).await else {
                            return;
                        };
                        let call = calls.fetch_add(1, Ordering::SeqCst);
                        let status = statuses[call.min(statuses.len() - 1)];
                        let _ = tx.send(captured);

                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status,
                            reason(status)
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (header_end + content_length).min(buf.len());
    let body = serde_json::from_slice(&buf[header_end..body_end]).unwrap_or(Value::Null);
    let request_line = head.lines().next().unwrap_or_default().to_string();

    Some(Captured {
        request_line,
        headers: head,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}
