//! Client configuration.

use serde::{Deserialize, Serialize};

use super::http::HttpConfig;
use crate::error::{BindError, Result};
use crate::retry::RetryPolicy;

/// Where and how a client reaches the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL scheme, `https` unless talking to a local test server.
    pub scheme: String,
    /// Host of the regular API, e.g. `api.example.com`.
    pub host: String,
    /// Path prefix of the regular API, e.g. `/1.1`.
    pub api_root: String,
    /// Host of the upload API. Falls back to `host` when empty.
    pub upload_host: String,
    /// Path prefix of the upload API.
    pub upload_root: String,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: String::new(),
            api_root: String::new(),
            upload_host: String::new(),
            upload_root: String::new(),
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn builder(host: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(host)
    }

    /// Host and root for regular or upload endpoints.
    pub fn target(&self, upload_api: bool) -> (&str, &str) {
        if upload_api {
            let host = if self.upload_host.is_empty() {
                &self.host
            } else {
                &self.upload_host
            };
            (host.as_str(), self.upload_root.as_str())
        } else {
            (self.host.as_str(), self.api_root.as_str())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(BindError::ConfigurationError("host must not be empty".into()));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(BindError::ConfigurationError(format!(
                "unsupported scheme '{}'",
                self.scheme
            )));
        }
        Ok(())
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                host: host.into(),
                ..Default::default()
            },
        }
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.config.scheme = scheme.into();
        self
    }

    pub fn api_root(mut self, root: impl Into<String>) -> Self {
        self.config.api_root = root.into();
        self
    }

    pub fn upload_host(mut self, host: impl Into<String>) -> Self {
        self.config.upload_host = host.into();
        self
    }

    pub fn upload_root(mut self, root: impl Into<String>) -> Self {
        self.config.upload_root = root.into();
        self
    }

    pub fn http(mut self, http: HttpConfig) -> Self {
        self.config.http = http;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_target_falls_back_to_main_host() {
        let config = ClientConfig::builder("api.example.com")
            .api_root("/1.1")
            .upload_root("/1.1")
            .build()
            .unwrap();
        assert_eq!(config.target(false), ("api.example.com", "/1.1"));
        assert_eq!(config.target(true), ("api.example.com", "/1.1"));

        let config = ClientConfig::builder("api.example.com")
            .upload_host("upload.example.com")
            .build()
            .unwrap();
        assert_eq!(config.target(true).0, "upload.example.com");
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = ClientConfig::builder("  ").build().unwrap_err();
        assert!(matches!(err, BindError::ConfigurationError(_)));
    }

    #[test]
    fn deserializes_nested_sections() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "host": "api.example.com",
                "api_root": "/2",
                "http": {"timeout": 5},
                "retry": {"retry_count": 2, "wait_on_rate_limit": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.scheme, "https");
        assert_eq!(config.http.timeout.as_secs(), 5);
        assert_eq!(config.retry.retry_count, 2);
        assert!(config.retry.wait_on_rate_limit);
        config.validate().unwrap();
    }
}
