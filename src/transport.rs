//! HTTP transport abstraction.
//!
//! The execution loop never talks to `reqwest` directly. It opens one
//! [`HttpSession`] per call through an injectable [`HttpTransport`], sends
//! every attempt through that session and drops it on every exit path.
//! Tests and embedders can provide their own transport to observe the
//! final URL/headers/body and return synthetic responses.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use secrecy::ExposeSecret;

use crate::auth::Credentials;
use crate::error::{BindError, Result};
use crate::types::HttpConfig;

/// Transport-level request data for one attempt.
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// Query parameters, already validated and stringified.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// `application/x-www-form-urlencoded` body.
    pub form: Option<Vec<(String, String)>>,
    pub json: Option<serde_json::Value>,
    pub credentials: Option<Credentials>,
}

/// Transport-level response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Header value as text, when present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Creates scoped sessions. Implementations must be safe to share between
/// methods running on different threads.
pub trait HttpTransport: Send + Sync {
    fn open(&self, config: &HttpConfig) -> Result<Box<dyn HttpSession>>;
}

/// One open network session, owned by a single call.
///
/// Any resources are released when the session is dropped.
pub trait HttpSession {
    /// Send one attempt. Errors mean no response was received at all.
    fn send(&mut self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Blocking transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl HttpTransport for ReqwestTransport {
    fn open(&self, config: &HttpConfig) -> Result<Box<dyn HttpSession>> {
        let mut builder = reqwest::blocking::Client::builder().timeout(config.timeout);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| BindError::ConfigurationError(format!("Invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| {
            BindError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        tracing::trace!(target: "apibind::http", "session opened");
        Ok(Box::new(ReqwestSession { client }))
    }
}

struct ReqwestSession {
    client: reqwest::blocking::Client,
}

impl HttpSession for ReqwestSession {
    fn send(&mut self, request: TransportRequest) -> Result<TransportResponse> {
        let mut rb = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            rb = rb.query(&request.query);
        }
        if let Some(form) = &request.form {
            rb = rb.form(form);
        }
        if let Some(json) = &request.json {
            rb = rb.json(json);
        }
        rb = match request.credentials {
            Some(Credentials::Bearer(token)) => rb.bearer_auth(token.expose_secret()),
            Some(Credentials::Basic { username, password }) => {
                rb.basic_auth(username, Some(password.expose_secret()))
            }
            Some(Credentials::Headers(headers)) => rb.headers(headers),
            None => rb,
        };

        let resp = rb
            .send()
            .map_err(|e| BindError::TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .text()
            .map_err(|e| BindError::TransportError(e.to_string()))?;
        Ok(TransportResponse::new(status, headers, body))
    }
}

impl Drop for ReqwestSession {
    fn drop(&mut self) {
        tracing::trace!(target: "apibind::http", "session closed");
    }
}

/// Build a header map from configured string pairs.
pub fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            BindError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            BindError::ConfigurationError(format!("Invalid header value '{value}': {e}"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Merge `overrides` on top of `base`; later values replace earlier ones.
pub fn merge_headers(mut base: HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    for (name, value) in overrides {
        base.insert(name.clone(), value.clone());
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_half_open() {
        let ok = TransportResponse::new(204, HeaderMap::new(), "");
        let redirect = TransportResponse::new(300, HeaderMap::new(), "");
        let early = TransportResponse::new(199, HeaderMap::new(), "");
        assert!(ok.is_success());
        assert!(!redirect.is_success());
        assert!(!early.is_success());
    }

    #[test]
    fn build_headers_rejects_invalid_names() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "v".to_string());
        let err = build_headers(&headers).unwrap_err();
        assert!(matches!(err, BindError::ConfigurationError(_)));
    }

    #[test]
    fn merge_headers_prefers_overrides() {
        let mut base = HashMap::new();
        base.insert("x-client".to_string(), "a".to_string());
        base.insert("x-shared".to_string(), "base".to_string());
        let mut overrides = HashMap::new();
        overrides.insert("x-shared".to_string(), "method".to_string());

        let merged = merge_headers(
            build_headers(&base).unwrap(),
            &build_headers(&overrides).unwrap(),
        );
        assert_eq!(merged.get("x-client").unwrap(), "a");
        assert_eq!(merged.get("x-shared").unwrap(), "method");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("5"));
        let resp = TransportResponse::new(429, headers, "");
        assert_eq!(resp.header("Retry-After"), Some("5"));
    }
}
