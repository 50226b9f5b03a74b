//! Core error types.

use thiserror::Error;

use crate::transport::TransportResponse;

/// Coarse classification used by callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Local parameter validation, never retried.
    Validation,
    /// Missing or failing credentials.
    Authentication,
    /// Connection, DNS or timeout failure before a response arrived.
    Network,
    /// The remote service reported an exhausted rate-limit window.
    RateLimit,
    /// Non-2xx response in the 4xx range.
    Client,
    /// Non-2xx response in the 5xx range.
    Server,
    /// Response body could not be decoded.
    Parsing,
    /// Invalid client or method configuration.
    Configuration,
    Internal,
}

/// Every failure a bound API call can end in.
#[derive(Debug, Clone, Error)]
pub enum BindError {
    /// More positional arguments than declared parameter names.
    #[error("Too many parameters supplied: {supplied} given, {allowed} allowed")]
    TooManyParameters { supplied: usize, allowed: usize },

    /// The same parameter was supplied positionally and by name.
    #[error("Multiple values for parameter {name} supplied")]
    DuplicateParameter { name: String },

    /// The method requires authentication but no handler is configured.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The authentication handler failed to produce credentials.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request never produced a response.
    #[error("Failed to send request: {0}")]
    TransportError(String),

    /// Final response matched the rate-limit error signature.
    #[error("Rate limit exceeded: {message}")]
    RateLimitError {
        message: String,
        response: Box<TransportResponse>,
    },

    /// Final response was a non-2xx status.
    #[error("API error {status}: {message}")]
    ApiError {
        message: String,
        code: Option<i64>,
        status: u16,
        response: Box<TransportResponse>,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl BindError {
    /// Build an `ApiError` from the authoritative response.
    pub fn api_error(
        message: impl Into<String>,
        code: Option<i64>,
        response: TransportResponse,
    ) -> Self {
        Self::ApiError {
            message: message.into(),
            code,
            status: response.status,
            response: Box::new(response),
        }
    }

    /// HTTP status of the response behind this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// API-specific error code reported in the error body.
    pub const fn api_code(&self) -> Option<i64> {
        match self {
            Self::ApiError { code, .. } => *code,
            _ => None,
        }
    }

    /// The last response received before the call failed.
    pub fn response(&self) -> Option<&TransportResponse> {
        match self {
            Self::RateLimitError { response, .. } | Self::ApiError { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    pub const fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimitError { .. })
    }

    /// Whether the failure happened before any network activity.
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::TooManyParameters { .. }
                | Self::DuplicateParameter { .. }
                | Self::AuthenticationRequired
                | Self::ConfigurationError(_)
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TooManyParameters { .. } | Self::DuplicateParameter { .. } => {
                ErrorCategory::Validation
            }
            Self::AuthenticationRequired | Self::AuthenticationError(_) => {
                ErrorCategory::Authentication
            }
            Self::TransportError(_) => ErrorCategory::Network,
            Self::RateLimitError { .. } => ErrorCategory::RateLimit,
            Self::ApiError { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                420 | 429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::ParseError(_) | Self::JsonError(_) => ErrorCategory::Parsing,
            Self::InternalError(_) => ErrorCategory::Internal,
        }
    }
}

/// Result type for bound API calls
pub type Result<T> = std::result::Result<T, BindError>;
