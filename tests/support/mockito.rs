//! mockito test utilities
//!
//! The client is blocking, so these wrap the synchronous mockito server.

#![allow(dead_code)]

use apibind::types::{ClientConfig, ClientConfigBuilder};
use mockito::{Matcher, Server, ServerGuard};

pub fn start() -> ServerGuard {
    Server::new()
}

/// Client configuration pointing at the mock server over plain HTTP.
pub fn config_for(server: &ServerGuard) -> ClientConfigBuilder {
    ClientConfig::builder(server.host_with_port())
        .scheme("http")
        .api_root("/1.1")
}

/// Matches the request path regardless of the query string.
pub fn path(path: &str) -> Matcher {
    Matcher::Regex(format!("^{}", regex_escape(path)))
}

fn regex_escape(raw: &str) -> String {
    raw.replace('.', "\\.")
}

/// Register a JSON mock that expects to be hit `hits` times.
pub fn json_mock(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: &str,
    hits: usize,
) -> mockito::Mock {
    server
        .mock(method, self::path(path))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create()
}
