//! # apibind
//!
//! Declarative binding of remote HTTP API methods with a resilient,
//! blocking execution engine.
#![deny(unsafe_code)]

//! A bound method ([`invoker::ApiMethod`]) carries its validated parameters,
//! target path and verb. Executing it:
//!
//! - serves GET calls from a pluggable response cache when possible;
//! - waits out an exhausted rate-limit window before sending;
//! - authenticates every attempt;
//! - retries failed attempts with a fixed delay or the server's
//!   `retry-after`, within a bounded retry budget;
//! - classifies the final failure as a rate-limit or a generic API error,
//!   carrying the last response;
//! - parses successful bodies and caches non-empty GET results.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apibind::prelude::*;
//! use std::time::Duration;
//!
//! const USER_TIMELINE: Endpoint = Endpoint::get("/statuses/user_timeline.json")
//!     .allowed_params(&["user_id", "screen_name", "count", "max_id"])
//!     .payload_list()
//!     .paginated(PaginationMode::Id);
//!
//! fn main() -> apibind::error::Result<()> {
//!     apibind::telemetry::init_from_env()?;
//!
//!     let config = ClientConfig::builder("api.example.com")
//!         .api_root("/1.1")
//!         .retry(
//!             RetryPolicy::new()
//!                 .with_retry_count(3)
//!                 .with_retry_delay(Duration::from_secs(5))
//!                 .with_retry_errors([500, 502, 503, 504])
//!                 .with_wait_on_rate_limit(true),
//!         )
//!         .build()?;
//!
//!     let client = ApiClient::builder(config)
//!         .auth(BearerAuth::from_env("API_BEARER_TOKEN")?)
//!         .memory_cache(Duration::from_secs(60))
//!         .build()?;
//!
//!     let timeline = USER_TIMELINE.call(
//!         &client,
//!         CallArgs::new().param("screen_name", "rustlang").param("count", 20),
//!     )?;
//!     println!("{} ({:?})", timeline.payload, timeline.source);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod clock;
pub mod endpoint;
pub mod error;
pub mod invoker;
pub mod params;
pub mod parser;
pub mod rate_limit;
pub mod retry;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::{BindError, ErrorCategory, Result};
pub use invoker::{ApiMethod, ApiResult, ExecuteOptions, MethodOptions, ResultSource};

/// Commonly used types.
pub mod prelude {
    pub use crate::auth::{AuthHandler, BasicAuth, BearerAuth, Credentials};
    pub use crate::cache::{MemoryCache, ResponseCache};
    pub use crate::client::{ApiClient, ApiClientBuilder};
    pub use crate::endpoint::{CallArgs, Endpoint, PaginationMode, Verb};
    pub use crate::error::{BindError, ErrorCategory};
    pub use crate::invoker::{ApiMethod, ApiResult, ExecuteOptions, MethodOptions, ResultSource};
    pub use crate::params::{ParamValue, ParameterSchema, ParameterSet};
    pub use crate::parser::{Cursors, JsonParser, Payload, RawParser, ResponseParser};
    pub use crate::retry::RetryPolicy;
    pub use crate::types::{ClientConfig, HttpConfig};
}
