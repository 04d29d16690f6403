//! HTTP client facade
//!
//! [`HttpClient`] wraps a [`Limiter`] with a base URL, default headers, and
//! verb convenience methods. Every verb call forwards to the limiter's
//! `fetch` with the method preset and the path combined with the base URL.

use crate::error::Result;
use crate::limiter::{Limiter, LimiterConfig};
use crate::transport::HttpTransport;
use crate::types::RequestConfig;
use crate::url::combine_url;
use reqwest::{Client, Method, Response};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;


/// Configuration for the HTTP client facade
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL combined with request paths
    pub base_url: Option<String>,
    /// Headers applied to every request unless overridden per request
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
    /// Rate limiter configuration
    pub limiter: LimiterConfig,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            user_agent: format!("ratefetch/{}", env!("CARGO_PKG_VERSION")),
            limiter: LimiterConfig::default(),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for the HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the limiter configuration
    pub fn limiter(mut self, limiter: LimiterConfig) -> Self {
        self.config.limiter = limiter;
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with rate limiting, retries, and verb helpers
pub struct HttpClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    limiter: Limiter,
}

impl HttpClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");
        let transport = Arc::new(HttpTransport::with_client(client));
        let limiter = Limiter::with_transport(config.limiter, transport);

        Self {
            base_url: config.base_url,
            default_headers: config.default_headers,
            limiter,
        }
    }

    /// The underlying limiter shared by all requests of this client
    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, path, config).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::POST, path, config).await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::PUT, path, config).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::DELETE, path, config).await
    }

    /// Make a HEAD request
    pub async fn head(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::HEAD, path, config).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::PATCH, path, config).await
    }

    /// Make a request with an explicit method
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        mut config: RequestConfig,
    ) -> Result<Response> {
        let url = self.build_url(path)?;
        config.method = Some(method);
        for (key, value) in &self.default_headers {
            config
                .headers
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self.limiter.fetch(url, config).await
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        match &self.base_url {
            Some(base) => combine_url(base, path),
            None => Ok(Url::parse(path)?),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.len())
            .field("limiter", &self.limiter)
            .finish()
    }
}
