//! Shared test support
//!
//! - `ScriptedTransport`: in-memory transport that replays canned responses
//!   and records every request it was asked to send
//! - `RecordingClock`: virtual clock that advances on `sleep` instead of
//!   blocking
//! - `mockito`: thin wrappers around the blocking mockito server

#![allow(dead_code)]

pub mod mockito;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apibind::auth::Credentials;
use apibind::clock::Clock;
use apibind::error::{BindError, Result};
use apibind::transport::{HttpSession, HttpTransport, TransportRequest, TransportResponse};
use apibind::types::{ClientConfig, HttpConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

pub const NOW: i64 = 1_700_000_000;

/// What the scripted transport saw for one attempt.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub form: Option<Vec<(String, String)>>,
    pub json: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Response(TransportResponse),
    Fail(String),
}

pub fn response(status: u16, headers: &[(&str, &str)], body: &str) -> Reply {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    Reply::Response(TransportResponse::new(status, map, body))
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    /// Replayed once the queue is empty.
    fallback: Option<Reply>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().replies = replies.into_iter().collect();
        transport
    }

    /// Answer every request with `reply`.
    pub fn always(reply: Reply) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().fallback = Some(reply);
        transport
    }

    pub fn sends(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl HttpTransport for ScriptedTransport {
    fn open(&self, _config: &HttpConfig) -> Result<Box<dyn HttpSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            transport: self.clone(),
        }))
    }
}

struct ScriptedSession {
    transport: ScriptedTransport,
}

impl HttpSession for ScriptedSession {
    fn send(&mut self, request: TransportRequest) -> Result<TransportResponse> {
        let bearer = match &request.credentials {
            Some(Credentials::Bearer(token)) => {
                use secrecy::ExposeSecret;
                Some(token.expose_secret().to_string())
            }
            _ => None,
        };
        let mut script = self.transport.script.lock().unwrap();
        script.requests.push(RecordedRequest {
            method: request.method,
            url: request.url,
            query: request.query,
            headers: request.headers,
            form: request.form,
            json: request.json,
            bearer,
        });
        let reply = match script.replies.pop_front() {
            Some(reply) => reply,
            None => script
                .fallback
                .clone()
                .expect("scripted transport ran out of replies"),
        };
        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Fail(message) => Err(BindError::TransportError(message)),
        }
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.transport.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Virtual clock: `sleep` records the duration and advances time.
#[derive(Clone)]
pub struct RecordingClock {
    now: Arc<AtomicI64>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn at(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
            sleeps: Arc::default(),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }

    pub fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Clock for RecordingClock {
    fn now_epoch_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.now
            .fetch_add(duration.as_secs() as i64, Ordering::SeqCst);
    }
}

pub fn config() -> apibind::types::ClientConfigBuilder {
    ClientConfig::builder("api.example.com")
        .api_root("/1.1")
        .upload_host("upload.example.com")
        .upload_root("/1.1")
}
