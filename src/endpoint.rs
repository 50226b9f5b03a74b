//! Static endpoint descriptions.
//!
//! An [`Endpoint`] describes one remote method once, as a `const`, and can
//! then be bound ([`Endpoint::bind`]) or bound and executed
//! ([`Endpoint::call`]) any number of times:
//!
//! ```rust,no_run
//! use apibind::prelude::*;
//!
//! const SHOW_STATUS: Endpoint = Endpoint::get("/statuses/show.json")
//!     .allowed_params(&["id", "trim_user", "include_entities"]);
//!
//! # fn main() -> apibind::error::Result<()> {
//! let config = ClientConfig::builder("api.example.com").api_root("/1.1").build()?;
//! let client = ApiClient::builder(config).build()?;
//! let status = SHOW_STATUS.call(&client, CallArgs::new().arg(20).param("trim_user", true))?;
//! println!("{}", status.payload);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;
use crate::invoker::{ApiMethod, ApiResult, ExecuteOptions, MethodOptions};
use crate::params::{ParamValue, ParameterSchema, ParameterSet};
use crate::parser::ResponseParser;

/// HTTP verbs endpoints are declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

/// How callers page through an endpoint's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// `cursor` / `next_cursor` / `previous_cursor`
    Cursor,
    /// Direct-message style `next` token.
    DmCursor,
    /// `max_id` / `since_id`
    Id,
    /// `page` numbers
    Page,
    /// Opaque `next` token.
    Next,
}

/// Description of one remote API method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub verb: Verb,
    pub allowed_params: &'static [&'static str],
    pub require_auth: bool,
    pub upload_api: bool,
    pub payload_list: bool,
    pub use_cache: bool,
    /// Read by pagination helpers; the execution loop ignores it.
    pub pagination: Option<PaginationMode>,
    /// Sent with every call; call headers with the same name win.
    pub headers: &'static [(&'static str, &'static str)],
}

impl Endpoint {
    pub const fn new(verb: Verb, path: &'static str) -> Self {
        Self {
            path,
            verb,
            allowed_params: &[],
            require_auth: false,
            upload_api: false,
            payload_list: false,
            use_cache: true,
            pagination: None,
            headers: &[],
        }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(Verb::Get, path)
    }

    pub const fn post(path: &'static str) -> Self {
        Self::new(Verb::Post, path)
    }

    /// Parameter names, in the order positional arguments map to them.
    pub const fn allowed_params(mut self, names: &'static [&'static str]) -> Self {
        self.allowed_params = names;
        self
    }

    pub const fn require_auth(mut self) -> Self {
        self.require_auth = true;
        self
    }

    pub const fn upload(mut self) -> Self {
        self.upload_api = true;
        self
    }

    pub const fn payload_list(mut self) -> Self {
        self.payload_list = true;
        self
    }

    pub const fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub const fn paginated(mut self, mode: PaginationMode) -> Self {
        self.pagination = Some(mode);
        self
    }

    pub const fn headers(mut self, headers: &'static [(&'static str, &'static str)]) -> Self {
        self.headers = headers;
        self
    }

    pub fn schema(&self) -> ParameterSchema {
        ParameterSchema::new(self.allowed_params.iter().copied())
    }

    /// Build an [`ApiMethod`] without executing it.
    pub fn bind<P: ResponseParser>(&self, client: &ApiClient<P>, args: &CallArgs) -> Result<ApiMethod<P>> {
        let params = ParameterSet::build(
            &args.positional,
            args.named.iter().map(|(k, v)| (k.as_str(), v.clone())),
            &self.schema(),
        )?;
        let options = MethodOptions {
            require_auth: self.require_auth,
            upload_api: self.upload_api,
            payload_list: self.payload_list,
            headers: self.merged_headers(&args.headers),
            json_payload: args.json.clone(),
        };
        ApiMethod::new(client, self.verb.as_method(), self.path, params, options)
    }

    fn merged_headers(&self, overrides: &HashMap<String, String>) -> HashMap<String, String> {
        let mut headers: HashMap<String, String> = self
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        headers.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        headers
    }

    /// Bind and execute in one step.
    pub fn call<P: ResponseParser>(&self, client: &ApiClient<P>, args: CallArgs) -> Result<ApiResult<P::Output>> {
        let mut method = self.bind(client, &args)?;
        method.execute(ExecuteOptions {
            post_data: args.post_data,
            return_cursors: args.return_cursors,
            use_cache: self.use_cache && args.use_cache,
        })
    }
}

/// Arguments for one endpoint call.
#[derive(Debug, Clone)]
pub struct CallArgs {
    positional: Vec<ParamValue>,
    named: Vec<(String, ParamValue)>,
    headers: HashMap<String, String>,
    json: Option<Value>,
    post_data: Option<Vec<(String, String)>>,
    return_cursors: bool,
    use_cache: bool,
}

impl Default for CallArgs {
    fn default() -> Self {
        Self {
            positional: Vec::new(),
            named: Vec::new(),
            headers: HashMap::new(),
            json: None,
            post_data: None,
            return_cursors: false,
            use_cache: true,
        }
    }
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next positional argument.
    pub fn arg(mut self, value: impl Into<ParamValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn post_data(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_data
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn return_cursors(mut self) -> Self {
        self.return_cursors = true;
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}
