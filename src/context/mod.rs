//! Per-request context handed to route handlers and middleware.
//!
//! A [`Context`] owns the parsed [`Request`] together with the path
//! parameters the router captured for the matched pattern.

use std::collections::HashMap;

use crate::Request;

/// Path parameters captured from the matched route, already percent-decoded.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PathParams {
    map: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.map.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The request plus routing results, moved through the middleware chain.
pub struct Context {
    request: Request,
    params: PathParams,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self::with_params(request, PathParams::new())
    }

    pub fn with_params(request: Request, params: PathParams) -> Self {
        Self { request, params }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Shorthand for `ctx.request().query_param(key)`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.query_param(key)
    }
}
