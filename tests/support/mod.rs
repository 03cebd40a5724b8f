//! A scripted stand-in for the Ollama HTTP API
//!
//! Serves `GET /api/tags` and streaming `POST /api/generate` on a loopback
//! port, one connection per request with `Connection: close`, so the body ends
//! when the socket does.

#![allow(dead_code)]

use serde_json::json;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How the fake server answers one `/api/generate` call
#[derive(Debug, Clone)]
pub enum Reply {
    /// Streams each chunk as its own NDJSON unit, then a `done` unit
    Stream(Vec<String>),
    /// Streams the chunks and closes the socket without a `done` unit
    Truncated(Vec<String>),
    /// Streams the chunks, then holds the socket open without sending more
    Stall { chunks: Vec<String>, hold: Duration },
    /// Writes each line verbatim as the body, then closes
    Raw(Vec<String>),
    /// Plain error response
    Status(u16, String),
}

impl Reply {
    /// Splits `text` into small chunks the way a model streams tokens
    pub fn streamed(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Reply::Stream(chars.chunks(7).map(|c| c.iter().collect()).collect())
    }
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    models: Vec<String>,
    generate_bodies: Vec<serde_json::Value>,
}

pub struct FakeOllama {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl FakeOllama {
    /// Starts the server; it lives until the test process exits
    pub fn start(models: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake ollama");
        let addr = listener.local_addr().expect("local addr");
        let state = Arc::new(Mutex::new(State {
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let shared = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &shared));
            }
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn push(&self, reply: Reply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    /// Bodies received on `/api/generate`, in order
    pub fn generate_bodies(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().generate_bodies.clone()
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let Some((method, path, body)) = read_request(&stream) else {
        return;
    };

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/tags") => {
            let models: Vec<_> = state
                .lock()
                .unwrap()
                .models
                .iter()
                .map(|name| json!({ "name": name, "size": 1 }))
                .collect();
            let body = json!({ "models": models }).to_string();
            let _ = write_response(&mut stream, 200, "application/json", &body);
        }
        ("POST", "/api/generate") => {
            let reply = {
                let mut state = state.lock().unwrap();
                if let Ok(value) = serde_json::from_slice(&body) {
                    state.generate_bodies.push(value);
                }
                state
                    .replies
                    .pop_front()
                    .unwrap_or_else(|| Reply::Status(500, "no scripted reply".to_string()))
            };
            let _ = write_generate(&mut stream, reply);
        }
        _ => {
            let _ = write_response(&mut stream, 404, "text/plain", "404 page not found");
        }
    }
}

fn read_request(stream: &TcpStream) -> Option<(String, String, Vec<u8>)> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some((method, path, body))
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        _ => "500 Internal Server Error",
    }
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &str,
) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line(status),
        content_type,
        body.len(),
        body
    )?;
    stream.flush()
}

fn write_generate(stream: &mut TcpStream, reply: Reply) -> std::io::Result<()> {
    let (chunks, complete, hold) = match reply {
        Reply::Status(status, body) => {
            return write_response(stream, status, "application/json", &body)
        }
        Reply::Raw(lines) => {
            write_ndjson_header(stream)?;
            for line in lines {
                writeln!(stream, "{}", line)?;
                stream.flush()?;
            }
            return stream.shutdown(std::net::Shutdown::Write);
        }
        Reply::Stream(chunks) => (chunks, true, None),
        Reply::Truncated(chunks) => (chunks, false, None),
        Reply::Stall { chunks, hold } => (chunks, false, Some(hold)),
    };

    write_ndjson_header(stream)?;
    for chunk in chunks {
        writeln!(stream, "{}", chunk_unit(&chunk))?;
        stream.flush()?;
    }
    if let Some(hold) = hold {
        thread::sleep(hold);
    }
    if complete {
        writeln!(stream, "{}", done_unit())?;
    }
    stream.flush()?;
    stream.shutdown(std::net::Shutdown::Write)
}

fn write_ndjson_header(stream: &mut TcpStream) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nConnection: close\r\n\r\n"
    )?;
    stream.flush()
}

/// One in-progress generate unit carrying `chunk`
pub fn chunk_unit(chunk: &str) -> String {
    json!({ "model": "fake", "response": chunk, "done": false }).to_string()
}

/// The closing generate unit
pub fn done_unit() -> String {
    json!({ "model": "fake", "response": "", "done": true, "eval_count": 42 }).to_string()
}

/// A typical model reply: critique followed by a corrected Dockerfile
pub const REVIEW: &str = "## Issues\n\n1. The base image tag is not pinned.\n2. The container runs as root.\n\n## Corrected Dockerfile\n\n```dockerfile\nFROM node:20-alpine\nWORKDIR /app\nCOPY package*.json ./\nRUN npm ci --omit=dev\nCOPY . .\nUSER node\nCMD [\"node\", \"server.js\"]\n```\n";

/// The Dockerfile block inside [`REVIEW`]
pub const REVIEW_DOCKERFILE: &str = "FROM node:20-alpine\nWORKDIR /app\nCOPY package*.json ./\nRUN npm ci --omit=dev\nCOPY . .\nUSER node\nCMD [\"node\", \"server.js\"]";

pub const INPUT_DOCKERFILE: &str = "FROM node\nCOPY . .\nRUN npm install\nCMD node server.js\n";
