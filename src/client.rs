//! API client
//!
//! `ApiClient` is the owning handle every bound method is created from. It
//! carries the configuration and the collaborators (authentication, cache,
//! parser, transport and clock) and is cheap to clone.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::auth::AuthHandler;
use crate::cache::{MemoryCache, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::invoker::{ApiMethod, MethodOptions};
use crate::params::ParameterSet;
use crate::parser::{JsonParser, Parsed, ResponseParser};
use crate::transport::{HttpTransport, ReqwestTransport, build_headers};
use crate::types::ClientConfig;

/// Parser-independent part of a client. Payloads hold on to it so cached
/// and fresh results can reach the client that produced them.
pub struct ClientContext {
    config: ClientConfig,
    default_headers: HeaderMap,
    auth: Option<Arc<dyn AuthHandler>>,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
}

impl ClientContext {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    pub fn auth(&self) -> Option<&Arc<dyn AuthHandler>> {
        self.auth.as_ref()
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Headers from `config.http.headers`, validated at build time.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("host", &self.config.host)
            .field("api_root", &self.config.api_root)
            .field("has_auth", &self.auth.is_some())
            .finish()
    }
}

/// Shared cache of parsed results for a parser's output type.
pub type SharedCache<T> = Arc<dyn ResponseCache<Parsed<T>>>;

pub struct ApiClient<P: ResponseParser = JsonParser> {
    context: Arc<ClientContext>,
    parser: Arc<P>,
    cache: Option<SharedCache<P::Output>>,
}

impl<P: ResponseParser> Clone for ApiClient<P> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            parser: Arc::clone(&self.parser),
            cache: self.cache.clone(),
        }
    }
}

impl<P: ResponseParser> fmt::Debug for ApiClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("context", &self.context)
            .field("has_cache", &self.cache.is_some())
            .finish()
    }
}

impl ApiClient<JsonParser> {
    /// Builder for a client that parses JSON responses.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder<JsonParser> {
        ApiClientBuilder::new(config, JsonParser)
    }
}

impl<P: ResponseParser> ApiClient<P> {
    pub fn context(&self) -> &Arc<ClientContext> {
        &self.context
    }

    pub fn config(&self) -> &ClientConfig {
        &self.context.config
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn cache(&self) -> Option<&SharedCache<P::Output>> {
        self.cache.as_ref()
    }

    /// Bind a method on this client without executing it.
    pub fn method(
        &self,
        method: Method,
        path: impl Into<String>,
        params: ParameterSet,
        options: MethodOptions,
    ) -> Result<ApiMethod<P>> {
        ApiMethod::new(self, method, path, params, options)
    }
}

/// Builder for `ApiClient`
pub struct ApiClientBuilder<P: ResponseParser> {
    config: ClientConfig,
    parser: P,
    auth: Option<Arc<dyn AuthHandler>>,
    cache: Option<SharedCache<P::Output>>,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<P: ResponseParser> ApiClientBuilder<P> {
    pub fn new(config: ClientConfig, parser: P) -> Self {
        Self {
            config,
            parser,
            auth: None,
            cache: None,
            transport: None,
            clock: None,
        }
    }

    pub fn auth<A: AuthHandler + 'static>(self, auth: A) -> Self {
        self.auth_shared(Arc::new(auth))
    }

    pub fn auth_shared(mut self, auth: Arc<dyn AuthHandler>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn cache(mut self, cache: SharedCache<P::Output>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// In-memory LRU cache holding [`MemoryCache::DEFAULT_CAPACITY`] entries
    /// for `ttl` each.
    pub fn memory_cache(self, ttl: Duration) -> Self {
        let cache: SharedCache<P::Output> = Arc::new(MemoryCache::<Parsed<P::Output>>::with_ttl(ttl));
        self.cache(cache)
    }

    /// Defaults to [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ApiClient<P>> {
        self.config.validate()?;
        let default_headers = build_headers(&self.config.http.headers)?;
        let context = ClientContext {
            config: self.config,
            default_headers,
            auth: self.auth,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };
        Ok(ApiClient {
            context: Arc::new(context),
            parser: Arc::new(self.parser),
            cache: self.cache,
        })
    }
}
