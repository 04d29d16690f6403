//! Common types shared across the crate
//!
//! Defines the per-request configuration, request bodies, and the
//! status-interception types used by the limiter.

use crate::error::Error;
use bytes::Bytes;
use reqwest::{Method, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Query parameters merged into the URL before a request is enqueued
pub type QueryParams = HashMap<String, String>;

/// Request body payload
#[derive(Debug, Clone)]
pub enum Body {
    /// JSON body, sent with `Content-Type: application/json`
    Json(Value),
    /// Raw bytes, sent as-is
    Raw(Bytes),
}

/// Decision returned by a status handler for an intercepted response.
///
/// Replaces the callback-triple style of passing `resolve`/`reject`/`retry`
/// into the handler: a handler is a pure function from the response to one
/// of these actions, and the scheduler applies it.
pub enum StatusAction {
    /// Fulfill the request with this response
    Resolve(Response),
    /// Fail the request immediately, bypassing any remaining attempts
    Reject(Error),
    /// Re-enqueue the request; rejects with a max-attempts error once the
    /// attempt budget is spent
    Retry,
}

impl std::fmt::Debug for StatusAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusAction::Resolve(_) => f.write_str("Resolve"),
            StatusAction::Reject(e) => write!(f, "Reject({e})"),
            StatusAction::Retry => f.write_str("Retry"),
        }
    }
}

/// Handler invoked for a configured response status code
pub type StatusHandler = Arc<dyn Fn(Response) -> StatusAction + Send + Sync>;

/// Hook computing a scheduler-wide cooldown from a 429 response
pub type RetryAfterFn = Arc<dyn Fn(&Response) -> Duration + Send + Sync>;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// HTTP method; GET when unset
    pub method: Option<Method>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters appended to the URL
    pub query: QueryParams,
    /// Request body
    pub body: Option<Body>,
    /// Per-request timeout; None or zero runs unguarded
    pub timeout: Option<Duration>,
    /// Maximum attempt count; None disables retries
    pub attempts: Option<u32>,
    /// Spacing before a failed request is re-enqueued
    pub interval: Option<Duration>,
    /// Bypass queueing and throttling for this request
    pub unlimited: bool,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Set a raw body
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(Body::Raw(body.into()));
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the attempt limit
    #[must_use]
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Set the retry spacing
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Bypass the rate limiter for this request
    #[must_use]
    pub fn unlimited(mut self) -> Self {
        self.unlimited = true;
        self
    }
}
