//! Queued request entities and the scheduler's shared state

use crate::error::{Error, Result};
use crate::types::RequestConfig;
use reqwest::Response;
use std::collections::VecDeque;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

/// A pending request owned by the queue until dispatched.
///
/// The oneshot sender is consumed by `resolve`/`reject`, so an entity
/// settles at most once by construction.
pub(crate) struct RequestEntity {
    pub(crate) url: Url,
    pub(crate) config: RequestConfig,
    /// 1-based attempt counter
    pub(crate) attempt: u32,
    reply: oneshot::Sender<Result<Response>>,
}

impl RequestEntity {
    pub(crate) fn new(url: Url, config: RequestConfig) -> (Self, oneshot::Receiver<Result<Response>>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                url,
                config,
                attempt: 1,
                reply,
            },
            rx,
        )
    }

    /// Fulfill the caller's pending fetch
    pub(crate) fn resolve(self, response: Response) {
        if self.reply.send(Ok(response)).is_err() {
            debug!(url = %self.url, "caller dropped before response arrived");
        }
    }

    /// Fail the caller's pending fetch
    pub(crate) fn reject(self, error: Error) {
        if self.reply.send(Err(error)).is_err() {
            debug!(url = %self.url, "caller dropped before error arrived");
        }
    }
}

impl std::fmt::Debug for RequestEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestEntity")
            .field("url", &self.url.as_str())
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

/// State shared between the dispatch loop, completions, and enqueuers.
///
/// Guarded by a single mutex that is never held across an await, so every
/// mutation is serialized the way the single-loop design assumes.
#[derive(Debug, Default)]
pub(crate) struct SchedulerState {
    /// FIFO of not-yet-dispatched requests; unbounded, no backpressure
    pub(crate) queue: VecDeque<RequestEntity>,
    /// Dispatches started but not yet completed
    pub(crate) in_flight: usize,
    /// Scheduler-wide pause before the next dispatch, set by a 429 hook
    pub(crate) cooldown_until: Option<Instant>,
    /// True while a dispatch loop task is running
    pub(crate) loop_active: bool,
}
