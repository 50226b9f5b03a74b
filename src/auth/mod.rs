//! Authentication handlers.
//!
//! An [`AuthHandler`] is asked for credentials once per attempt, never once
//! per call, so handlers that refresh tokens can do so between retries.

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use secrecy::SecretString;

use crate::error::{BindError, Result};

/// Per-attempt credentials handed to the transport.
pub enum Credentials {
    /// `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// HTTP basic authentication.
    Basic {
        username: String,
        password: SecretString,
    },
    /// Pre-computed headers (for signed schemes such as OAuth 1.0a).
    Headers(HeaderMap),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Credentials::Bearer([REDACTED])"),
            Self::Basic { username, .. } => f
                .debug_struct("Credentials::Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Headers(headers) => f
                .debug_tuple("Credentials::Headers")
                .field(&headers.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Produces credentials for one attempt. `Ok(None)` sends the request
/// unauthenticated.
pub trait AuthHandler: Send + Sync {
    fn apply(&self) -> Result<Option<Credentials>>;
}

/// A synchronous Bearer token provider.
///
/// Implementations may cache tokens internally and refresh them when
/// necessary; [`BearerAuth`] calls it before every attempt.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Result<String>;
}

/// A simple static token provider useful for tests and basic scenarios where
/// the token is managed externally.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> Result<String> {
        use secrecy::ExposeSecret;
        Ok(self.token.expose_secret().to_string())
    }
}

/// Bearer token authentication.
#[derive(Clone)]
pub struct BearerAuth {
    provider: Arc<dyn TokenProvider>,
}

impl BearerAuth {
    /// Authenticate with a fixed token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_provider(Arc::new(StaticTokenProvider::new(token)))
    }

    /// Authenticate with tokens fetched from `provider` before each attempt.
    pub fn with_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }

    /// Read the token from an environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        let token = std::env::var(var).map_err(|_| {
            BindError::ConfigurationError(format!("Environment variable {var} is not set"))
        })?;
        if token.trim().is_empty() {
            return Err(BindError::ConfigurationError(format!(
                "Environment variable {var} is empty"
            )));
        }
        Ok(Self::new(token))
    }
}

impl AuthHandler for BearerAuth {
    fn apply(&self) -> Result<Option<Credentials>> {
        let token = self.provider.token()?;
        Ok(Some(Credentials::Bearer(SecretString::from(token))))
    }
}

/// HTTP basic authentication.
pub struct BasicAuth {
    username: String,
    password: SecretString,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl AuthHandler for BasicAuth {
    fn apply(&self) -> Result<Option<Credentials>> {
        use secrecy::ExposeSecret;
        Ok(Some(Credentials::Basic {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_string()),
        }))
    }
}
