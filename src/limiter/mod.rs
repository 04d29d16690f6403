//! Rate limiter
//!
//! A [`Limiter`] throttles request dispatch to a configured requests-per-
//! second ceiling, retries failures up to a per-request attempt limit, and
//! lets callers intercept specific response status codes.
//!
//! Requests enter an unbounded FIFO queue drained by a lazily-started
//! dispatch loop (see [`scheduler`]); the loop terminates itself once the
//! queue is empty and nothing is in flight. Requests marked `unlimited`
//! (or a limiter configured `unlimited`) bypass the queue entirely.

mod entity;
mod scheduler;


use crate::error::{Error, Result};
use crate::transport::{send_guarded, HttpTransport, Transport};
use crate::types::{RequestConfig, RetryAfterFn, StatusAction, StatusHandler};
use crate::url::apply_query;
use entity::{RequestEntity, SchedulerState};
use reqwest::Response;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for a [`Limiter`]
///
/// Immutable after construction and shared by every request the limiter
/// processes.
#[derive(Clone, Default)]
pub struct LimiterConfig {
    /// Dispatch-start ceiling per 1-second window; values below 1 are
    /// treated as 1
    pub rps: u32,
    /// Disable rate limiting for every request
    pub unlimited: bool,
    /// Cooldown hook invoked on 429 responses
    pub retry_after: Option<RetryAfterFn>,
    /// Per-status-code response handlers
    pub status: HashMap<u16, StatusHandler>,
}

impl LimiterConfig {
    /// Create a config builder
    pub fn builder() -> LimiterConfigBuilder {
        LimiterConfigBuilder::default()
    }

    pub(crate) fn effective_rps(&self) -> u32 {
        self.rps.max(1)
    }
}

impl std::fmt::Debug for LimiterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimiterConfig")
            .field("rps", &self.rps)
            .field("unlimited", &self.unlimited)
            .field("has_retry_after", &self.retry_after.is_some())
            .field("status_codes", &self.status.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`LimiterConfig`]
#[derive(Default)]
pub struct LimiterConfigBuilder {
    config: LimiterConfig,
}

impl LimiterConfigBuilder {
    /// Set the requests-per-second ceiling
    pub fn rps(mut self, rps: u32) -> Self {
        self.config.rps = rps;
        self
    }

    /// Disable rate limiting globally
    pub fn unlimited(mut self) -> Self {
        self.config.unlimited = true;
        self
    }

    /// Set the 429 cooldown hook. The returned duration delays the
    /// scheduler's next dispatch start; in-flight requests are unaffected.
    pub fn retry_after<F>(mut self, f: F) -> Self
    where
        F: Fn(&Response) -> Duration + Send + Sync + 'static,
    {
        self.config.retry_after = Some(Arc::new(f));
        self
    }

    /// Register a handler for a response status code
    pub fn on_status<F>(mut self, code: u16, f: F) -> Self
    where
        F: Fn(Response) -> StatusAction + Send + Sync + 'static,
    {
        self.config.status.insert(code, Arc::new(f));
        self
    }

    /// Build the config
    pub fn build(self) -> LimiterConfig {
        self.config
    }
}

/// Shared core between the limiter handle, the loop task, and completions
pub(crate) struct LimiterCore {
    pub(crate) config: LimiterConfig,
    pub(crate) transport: Arc<dyn Transport>,
    state: Mutex<SchedulerState>,
}

impl LimiterCore {
    /// Lock the scheduler state. Poisoning is recovered; no holder mutates
    /// the state across an unwind point.
    pub(crate) fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rate-limiting request scheduler with retry and status interception
///
/// Cloning is cheap and clones share the same queue, window, and config.
#[derive(Clone)]
pub struct Limiter {
    core: Arc<LimiterCore>,
}

impl Limiter {
    /// Create a limiter over a default HTTP transport
    pub fn new(config: LimiterConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a limiter over a custom transport
    pub fn with_transport(config: LimiterConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            core: Arc::new(LimiterCore {
                config,
                transport,
                state: Mutex::new(SchedulerState::default()),
            }),
        }
    }

    /// Fetch through the rate limiter.
    ///
    /// Query parameters are merged into the URL before the request is
    /// enqueued. If the request or the limiter is marked `unlimited`, the
    /// queue is bypassed entirely: no throttling, no retries, no cooldown.
    pub async fn fetch(&self, target: impl AsRef<str>, config: RequestConfig) -> Result<Response> {
        let url = self.prepare_url(target.as_ref(), &config)?;

        if config.unlimited || self.core.config.unlimited {
            return send_guarded(&*self.core.transport, &url, &config).await;
        }

        let (entity, rx) = RequestEntity::new(url, config);
        let start_loop = {
            let mut state = self.core.state();
            state.queue.push_back(entity);
            !std::mem::replace(&mut state.loop_active, true)
        };

        if start_loop {
            debug!("starting dispatch loop");
            tokio::spawn(scheduler::run(Arc::clone(&self.core)));
        }

        rx.await.map_err(|_| Error::ChannelClosed)?
    }

    /// Fetch without queueing or throttling.
    ///
    /// Runs the timeout-guarded transport call directly. No retry or
    /// attempt semantics apply on this path, even when `attempts` is set.
    pub async fn fetch_unlimited(
        &self,
        target: impl AsRef<str>,
        config: RequestConfig,
    ) -> Result<Response> {
        let url = self.prepare_url(target.as_ref(), &config)?;
        send_guarded(&*self.core.transport, &url, &config).await
    }

    /// Number of requests waiting in the queue (excludes in-flight)
    pub fn pending(&self) -> usize {
        self.core.state().queue.len()
    }

    fn prepare_url(&self, target: &str, config: &RequestConfig) -> Result<Url> {
        let mut url = Url::parse(target)?;
        apply_query(&mut url, &config.query);
        Ok(url)
    }
}

impl std::fmt::Debug for Limiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Limiter")
            .field("config", &self.core.config)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// One-off fetch without a limiter instance.
///
/// Equivalent to the unlimited path: merges query parameters, applies the
/// timeout guard, and sends over a fresh transport.
pub async fn fetch(target: impl AsRef<str>, config: RequestConfig) -> Result<Response> {
    let mut url = Url::parse(target.as_ref())?;
    apply_query(&mut url, &config.query);
    let transport = HttpTransport::new();
    send_guarded(&transport, &url, &config).await
}
