//! Transport layer
//!
//! The `Transport` trait is the "send this request, get a response or fail"
//! seam the limiter dispatches through. The production implementation wraps
//! `reqwest::Client`; tests swap in channel-backed mocks.
//!
//! `send_guarded` is the timeout guard: it races a send against a deadline
//! and converts expiry into [`Error::Timeout`]. Dropping the timed-out send
//! future aborts the in-flight request.

use crate::error::{Error, Result};
use crate::types::{Body, RequestConfig};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use url::Url;


/// Async request-sending primitive
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one request and return the response, or fail.
    ///
    /// The URL already carries the merged query parameters; `config`
    /// supplies method, headers, and body. Timeouts are applied by the
    /// caller via [`send_guarded`], not here.
    async fn send(&self, url: &Url, config: &RequestConfig) -> Result<Response>;
}

/// Transport backed by `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a default client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport over an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &Url, config: &RequestConfig) -> Result<Response> {
        let method = config.method.clone().unwrap_or(Method::GET);
        let mut req = self.client.request(method, url.clone());

        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        match &config.body {
            Some(Body::Json(value)) => req = req.json(value),
            Some(Body::Raw(bytes)) => req = req.body(bytes.clone()),
            None => {}
        }

        let response = req.send().await?;
        Ok(response)
    }
}

/// Race a transport send against the request's timeout.
///
/// A `None` or zero timeout runs the send unguarded. Expiry surfaces as
/// [`Error::Timeout`], distinct from transport failures, though both feed
/// the same retry path.
pub async fn send_guarded(
    transport: &dyn Transport,
    url: &Url,
    config: &RequestConfig,
) -> Result<Response> {
    match config.timeout {
        Some(timeout) if !timeout.is_zero() => {
            match tokio::time::timeout(timeout, transport.send(url, config)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            }
        }
        _ => transport.send(url, config).await,
    }
}
