//! Bound API method execution.
//!
//! [`ApiMethod`] owns the parameters, target and policy of one logical call
//! and runs it to completion:
//!
//! 1. serve GET calls from the response cache when possible;
//! 2. otherwise open a session and loop: wait out an exhausted rate-limit
//!    window, authenticate, send, classify the response, and sleep before
//!    retrying while the retry budget lasts;
//! 3. turn a final non-2xx response into a classified error, or parse the
//!    body and cache non-empty GET results.
//!
//! Transport failures are never retried here. Each method owns its own
//! rate-limit state; `execute` takes `&mut self`, so one method never has
//! more than one attempt in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;

use crate::cache::cache_key;
use crate::client::ApiClient;
use crate::error::{BindError, Result};
use crate::params::ParameterSet;
use crate::parser::{Cursors, ParseContext, Payload, ResponseParser};
use crate::rate_limit::{self, RateLimitState};
use crate::retry::{RetryBudget, RetryPolicy};
use crate::transport::{TransportRequest, TransportResponse, build_headers, merge_headers};

/// Per-method construction options.
#[derive(Debug, Clone, Default)]
pub struct MethodOptions {
    /// Fail at construction when the client has no authentication handler.
    pub require_auth: bool,
    /// Target the upload host and root instead of the regular API.
    pub upload_api: bool,
    /// Hint for parsers: the endpoint returns a list.
    pub payload_list: bool,
    /// Extra headers, layered over the client's default headers.
    pub headers: HashMap<String, String>,
    /// JSON request body.
    pub json_payload: Option<Value>,
}

impl MethodOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    pub const fn with_upload_api(mut self, upload_api: bool) -> Self {
        self.upload_api = upload_api;
        self
    }

    pub const fn with_payload_list(mut self, payload_list: bool) -> Self {
        self.payload_list = payload_list;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_json_payload(mut self, payload: Value) -> Self {
        self.json_payload = Some(payload);
        self
    }
}

/// Per-execution options.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Form-encoded request body.
    pub post_data: Option<Vec<(String, String)>>,
    /// Ask the parser for pagination cursors.
    pub return_cursors: bool,
    /// Allow the response cache for this execution.
    pub use_cache: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            post_data: None,
            return_cursors: false,
            use_cache: true,
        }
    }
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post_data<K, V, I>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.post_data = Some(
            data.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub const fn with_return_cursors(mut self, return_cursors: bool) -> Self {
        self.return_cursors = return_cursors;
        self
    }

    pub const fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Network,
    Cache,
}

/// A successfully executed call.
#[derive(Debug, Clone)]
pub struct ApiResult<T> {
    pub payload: T,
    pub cursors: Option<Cursors>,
    pub source: ResultSource,
    /// The successful response; `None` for cache hits.
    pub response: Option<TransportResponse>,
    /// Requests sent, zero for cache hits.
    pub attempts: u32,
}

impl<T> ApiResult<T> {
    pub fn is_cached(&self) -> bool {
        self.source == ResultSource::Cache
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

/// Classification of one received response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Another attempt may follow. With `delay: None` the loop goes straight
    /// back to the rate-limit gate without consuming retry budget.
    RetryableFailure { delay: Option<Duration> },
    /// The status is outside the retryable set; stop now.
    TerminalFailure,
}

/// One bound API call.
pub struct ApiMethod<P: ResponseParser> {
    client: ApiClient<P>,
    method: Method,
    path: String,
    params: ParameterSet,
    options: MethodOptions,
    headers: HeaderMap,
    rate_limit: RateLimitState,
}

impl<P: ResponseParser> ApiMethod<P> {
    /// Bind a call. Fails with `AuthenticationRequired` before any network
    /// activity when `options.require_auth` is set and the client has no
    /// authentication handler.
    pub fn new(
        client: &ApiClient<P>,
        method: Method,
        path: impl Into<String>,
        params: ParameterSet,
        options: MethodOptions,
    ) -> Result<Self> {
        if options.require_auth && !client.context().has_auth() {
            return Err(BindError::AuthenticationRequired);
        }
        let headers = merge_headers(
            client.context().default_headers().clone(),
            &build_headers(&options.headers)?,
        );
        Ok(Self {
            client: client.clone(),
            method,
            path: path.into(),
            params,
            options,
            headers,
            rate_limit: RateLimitState::new(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn options(&self) -> &MethodOptions {
        &self.options
    }

    /// Last known quota, as observed by this method only.
    pub fn rate_limit(&self) -> RateLimitState {
        self.rate_limit
    }

    pub fn url(&self) -> String {
        let config = self.client.config();
        let (host, root) = config.target(self.options.upload_api);
        format!("{}://{host}{root}{}", config.scheme, self.path)
    }

    pub fn cache_key(&self) -> String {
        let (_, root) = self.client.config().target(self.options.upload_api);
        cache_key(root, &self.path, &self.params.to_query_string())
    }

    fn uses_cache(&self, requested: bool) -> bool {
        requested && self.method == Method::GET && self.client.cache().is_some()
    }

    /// Run the call to completion.
    pub fn execute(&mut self, options: ExecuteOptions) -> Result<ApiResult<P::Output>> {
        let span = tracing::debug_span!(
            target: "apibind::http",
            "execute",
            method = %self.method,
            path = %self.path
        );
        let _entered = span.enter();

        let use_cache = self.uses_cache(options.use_cache);
        let key = self.cache_key();

        if use_cache && let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let context = Arc::clone(self.client.context());
        let policy = &context.config().retry;
        let url = self.url();

        let mut session = context.transport().open(&context.config().http)?;
        let mut budget = RetryBudget::new(policy.retry_count);
        let mut attempts = 0u32;
        let mut last_response: Option<TransportResponse> = None;

        while budget.has_remaining() {
            if policy.wait_on_rate_limit
                && let Some(wait) = self
                    .rate_limit
                    .wait_before_send(context.clock().now_epoch_secs())
            {
                if policy.wait_on_rate_limit_notify {
                    tracing::warn!(target: "apibind::http", url = %url, wait_secs = wait.as_secs(), "Rate limit reached, sleeping");
                } else {
                    tracing::debug!(target: "apibind::http", url = %url, wait_secs = wait.as_secs(), "rate limit reached, sleeping");
                }
                context.clock().sleep(wait);
            }

            let credentials = match context.auth() {
                Some(auth) => auth.apply()?,
                None => None,
            };

            let request = TransportRequest {
                method: self.method.clone(),
                url: url.clone(),
                query: self.params.as_pairs().to_vec(),
                headers: self.headers.clone(),
                form: options.post_data.clone(),
                json: self.options.json_payload.clone(),
                credentials,
            };

            attempts += 1;
            tracing::debug!(target: "apibind::http", url = %url, attempt = attempts, "sending request");
            let response = session.send(request).inspect_err(|e| {
                tracing::debug!(target: "apibind::http", url = %url, err = %e, "request error");
            })?;
            tracing::debug!(target: "apibind::http", url = %url, status = response.status, "response received");

            let outcome = self.classify(&response, policy, context.clock().now_epoch_secs());
            last_response = Some(response);

            match outcome {
                AttemptOutcome::Success | AttemptOutcome::TerminalFailure => break,
                AttemptOutcome::RetryableFailure { delay: None } => continue,
                AttemptOutcome::RetryableFailure { delay: Some(delay) } => {
                    tracing::debug!(
                        target: "apibind::http",
                        url = %url,
                        retries = budget.performed(),
                        delay_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    context.clock().sleep(delay);
                    budget.consume();
                }
            }
        }
        drop(session);

        let response = last_response.ok_or_else(|| {
            BindError::InternalError("retry loop finished without a response".into())
        })?;

        if !response.is_success() {
            return Err(self.surface_error(response));
        }

        let return_cursors = options.return_cursors || self.params.has_cursor_hint();
        let parse_ctx = ParseContext {
            path: &self.path,
            payload_list: self.options.payload_list,
        };
        let mut parsed = self
            .client
            .parser()
            .parse(&parse_ctx, &response.body, return_cursors)?;
        parsed.payload.attach(&context);

        if use_cache
            && !parsed.payload.is_empty()
            && let Some(cache) = self.client.cache()
        {
            cache.put(&key, parsed.clone());
        }

        Ok(ApiResult {
            payload: parsed.payload,
            cursors: parsed.cursors,
            source: ResultSource::Network,
            response: Some(response),
            attempts,
        })
    }

    fn cached(&self, key: &str) -> Option<ApiResult<P::Output>> {
        let mut hit = self.client.cache()?.get(key)?;
        hit.payload.attach(self.client.context());
        tracing::debug!(target: "apibind::http", key = %key, "cache hit");
        Some(ApiResult {
            payload: hit.payload,
            cursors: hit.cursors,
            source: ResultSource::Cache,
            response: None,
            attempts: 0,
        })
    }

    /// Classify a response and fold its rate-limit headers into the state.
    pub fn classify(
        &mut self,
        response: &TransportResponse,
        policy: &RetryPolicy,
        now_epoch_secs: i64,
    ) -> AttemptOutcome {
        if response.is_success() {
            return AttemptOutcome::Success;
        }

        self.rate_limit.update(&response.headers);

        let mut delay = policy.retry_delay;
        if policy.is_rate_limit_status(response.status) {
            // Only skip the budget when the gate will actually wait. With an
            // unknown or past reset this would resend immediately, forever.
            if self.rate_limit.remaining == Some(0)
                && self.rate_limit.wait_before_send(now_epoch_secs).is_some()
            {
                return AttemptOutcome::RetryableFailure { delay: None };
            }
            if let Some(retry_after) = rate_limit::retry_after(&response.headers) {
                delay = retry_after;
            }
        } else if !policy.is_retryable_status(response.status) {
            return AttemptOutcome::TerminalFailure;
        }

        AttemptOutcome::RetryableFailure { delay: Some(delay) }
    }

    fn surface_error(&self, response: TransportResponse) -> BindError {
        let (message, code) = self
            .client
            .parser()
            .parse_error(&response.body)
            .unwrap_or_else(|_| {
                (
                    format!("API error response: status code = {}", response.status),
                    None,
                )
            });

        tracing::debug!(
            target: "apibind::http",
            status = response.status,
            code = ?code,
            message = %message,
            "request failed"
        );

        if rate_limit::is_rate_limit_error(&message, code) {
            BindError::RateLimitError {
                message,
                response: Box::new(response),
            }
        } else {
            BindError::api_error(message, code, response)
        }
    }
}

impl<P: ResponseParser> std::fmt::Debug for ApiMethod<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMethod")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}
