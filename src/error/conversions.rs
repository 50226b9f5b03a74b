//! Type Conversions for BindError
//!
//! This module contains From trait implementations for converting
//! common error types into BindError.

use super::types::BindError;

impl From<reqwest::Error> for BindError {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}

impl From<serde_json::Error> for BindError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for BindError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::ConfigurationError(format!("Invalid header value: {err}"))
    }
}

impl From<reqwest::header::InvalidHeaderName> for BindError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::ConfigurationError(format!("Invalid header name: {err}"))
    }
}
