//! Response parsing.
//!
//! A [`ResponseParser`] turns the raw text of a successful response into a
//! typed payload (optionally with pagination cursors) and extracts the
//! message and code of an error response. Two parsers ship with the crate:
//! [`JsonParser`] for JSON APIs and [`RawParser`] which returns the body
//! untouched.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientContext;
use crate::error::{BindError, Result};

/// Pagination cursors extracted from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursors {
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// A parsed payload and its cursors. This is what the cache stores.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub payload: T,
    pub cursors: Option<Cursors>,
}

impl<T> Parsed<T> {
    pub const fn new(payload: T) -> Self {
        Self {
            payload,
            cursors: None,
        }
    }

    pub fn with_cursors(mut self, cursors: Cursors) -> Self {
        self.cursors = Some(cursors);
        self
    }
}

/// Result values produced by a parser.
pub trait Payload: Clone + Send + Sync + 'static {
    /// Empty results are never cached.
    fn is_empty(&self) -> bool;

    /// Re-bind the value to the client that produced it. Called for fresh
    /// and cached results alike, so both look the same to the caller.
    fn attach(&mut self, _client: &Arc<ClientContext>) {}
}

impl Payload for Value {
    fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
        }
    }
}

impl Payload for String {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl<T: Payload> Payload for Vec<T> {
    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }

    fn attach(&mut self, client: &Arc<ClientContext>) {
        for item in self.iter_mut() {
            item.attach(client);
        }
    }
}

/// What the parser knows about the call that produced a body.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub path: &'a str,
    /// The endpoint returns a list of payloads rather than one.
    pub payload_list: bool,
}

pub trait ResponseParser: Send + Sync + 'static {
    type Output: Payload;

    fn parse(
        &self,
        ctx: &ParseContext<'_>,
        raw: &str,
        return_cursors: bool,
    ) -> Result<Parsed<Self::Output>>;

    /// Message and optional API error code of an error body.
    fn parse_error(&self, raw: &str) -> Result<(String, Option<i64>)>;
}

/// Parses bodies as JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    fn cursor_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn extract_cursors(value: &Value) -> Option<Cursors> {
        let object = value.as_object()?;
        if let Some(next) = object.get("next") {
            return Some(Cursors {
                next: Self::cursor_text(next),
                previous: None,
            });
        }
        if let Some(next) = object.get("next_cursor") {
            return Some(Cursors {
                next: Self::cursor_text(next),
                previous: object.get("previous_cursor").and_then(Self::cursor_text),
            });
        }
        None
    }
}

impl ResponseParser for JsonParser {
    type Output = Value;

    fn parse(&self, ctx: &ParseContext<'_>, raw: &str, return_cursors: bool) -> Result<Parsed<Value>> {
        if raw.trim().is_empty() {
            return Ok(Parsed::new(Value::Null));
        }
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            BindError::ParseError(format!("Failed to parse JSON payload from {}: {e}", ctx.path))
        })?;
        let cursors = if return_cursors {
            Self::extract_cursors(&value)
        } else {
            None
        };
        Ok(Parsed {
            payload: value,
            cursors,
        })
    }

    fn parse_error(&self, raw: &str) -> Result<(String, Option<i64>)> {
        let value: Value = serde_json::from_str(raw)?;

        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                return Err(BindError::ParseError("error list without messages".into()));
            }
            let code = errors
                .iter()
                .find_map(|e| e.get("code").and_then(Value::as_i64));
            return Ok((messages.join("; "), code));
        }

        match value.get("error") {
            Some(Value::String(message)) => {
                let code = value.get("code").and_then(Value::as_i64);
                Ok((message.clone(), code))
            }
            Some(Value::Object(error)) => {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .ok_or_else(|| BindError::ParseError("error object without message".into()))?;
                let code = error.get("code").and_then(Value::as_i64);
                Ok((message.to_string(), code))
            }
            _ => Err(BindError::ParseError("unrecognized error body".into())),
        }
    }
}

/// Returns bodies untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawParser;

impl ResponseParser for RawParser {
    type Output = String;

    fn parse(&self, _ctx: &ParseContext<'_>, raw: &str, _return_cursors: bool) -> Result<Parsed<String>> {
        Ok(Parsed::new(raw.to_string()))
    }

    fn parse_error(&self, raw: &str) -> Result<(String, Option<i64>)> {
        if raw.trim().is_empty() {
            return Err(BindError::ParseError("empty error body".into()));
        }
        Ok((raw.to_string(), None))
    }
}
