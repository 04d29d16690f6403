//! The dispatch loop and completion policy
//!
//! One loop task runs per limiter while work is pending. The loop owns the
//! window counters; everything else (queue, in-flight count, cooldown) lives
//! in the mutexed scheduler state shared with completion tasks.
//!
//! Dispatch *starts* are rate-limited, not completions: up to `rps`
//! dispatches may be in flight concurrently per window, and completions may
//! straggle past the window boundary.

use super::entity::RequestEntity;
use super::LimiterCore;
use crate::error::Error;
use crate::transport::send_guarded;
use crate::types::StatusAction;
use reqwest::{Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::yield_now;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

const WINDOW: Duration = Duration::from_secs(1);

/// Drain the queue until it is empty and nothing is in flight.
///
/// Spawned when a fetch enqueues into an idle limiter; flips `loop_active`
/// off and returns once drained. Window counters are locals, so the window
/// restarts fresh each time the loop starts from idle.
pub(crate) async fn run(core: Arc<LimiterCore>) {
    let rps = core.config.effective_rps();
    let mut window_start = Instant::now();
    let mut dispatched_in_window: u32 = 0;

    loop {
        // A 429 hook may have scheduled a cooldown; it delays the next
        // dispatch start, not in-flight requests.
        let cooldown = core.state().cooldown_until.take();
        if let Some(until) = cooldown {
            if until > Instant::now() {
                debug!("cooling down before next dispatch");
                sleep_until(until).await;
            }
        }

        if dispatched_in_window >= rps {
            yield_now().await;
            continue;
        }

        let entity = {
            let mut state = core.state();
            let entity = state.queue.pop_front();
            if entity.is_some() {
                state.in_flight += 1;
            }
            entity
        };

        let dispatched_one = entity.is_some();
        if let Some(entity) = entity {
            dispatched_in_window += 1;
            debug!(url = %entity.url, attempt = entity.attempt, "dispatching request");
            tokio::spawn(dispatch(Arc::clone(&core), entity));
        }

        {
            let mut state = core.state();
            if state.queue.is_empty() && state.in_flight == 0 {
                state.loop_active = false;
                debug!("queue drained, stopping dispatch loop");
                return;
            }
        }

        // Transient empty queue with work still in flight: a completion may
        // requeue a retry, so yield and look again.
        if !dispatched_one {
            yield_now().await;
        }

        if dispatched_in_window == rps {
            let window_end = window_start + WINDOW;
            if window_end > Instant::now() {
                sleep_until(window_end).await;
            }
            dispatched_in_window = 0;
            window_start = Instant::now();
        }
    }
}

/// One fire-and-forget dispatch: guarded send, then the status policy.
///
/// The in-flight count drops only after the policy has run, so a retry is
/// back in the queue before the loop can see "empty and idle" and exit.
async fn dispatch(core: Arc<LimiterCore>, entity: RequestEntity) {
    let result = send_guarded(&*core.transport, &entity.url, &entity.config).await;

    match result {
        Ok(response) => on_response(&core, entity, response).await,
        Err(error) => on_failure(&core, entity, error).await,
    }

    core.state().in_flight -= 1;
}

/// Apply the status policy to a completed response.
///
/// The 429 cooldown hook runs first (it must observe the response even when
/// a 429 handler consumes it); then a configured status handler decides
/// resolve/reject/retry. Without a handler the raw response resolves the
/// request regardless of status code.
async fn on_response(core: &Arc<LimiterCore>, entity: RequestEntity, response: Response) {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        if let Some(retry_after) = &core.config.retry_after {
            let cooldown = retry_after(&response);
            warn!(
                url = %entity.url,
                cooldown_ms = cooldown.as_millis() as u64,
                "rate limit exceeded, scheduling cooldown"
            );
            core.state().cooldown_until = Some(Instant::now() + cooldown);
        }
    }

    match core.config.status.get(&response.status().as_u16()) {
        Some(handler) => match handler(response) {
            StatusAction::Resolve(response) => entity.resolve(response),
            StatusAction::Reject(error) => {
                debug!(url = %entity.url, %error, "status handler rejected request");
                entity.reject(error);
            }
            StatusAction::Retry => requeue(core, entity, None).await,
        },
        None => entity.resolve(response),
    }
}

/// Retry a failed dispatch, or surface the error once attempts run out.
/// With `attempts` unset the first failure surfaces immediately.
async fn on_failure(core: &Arc<LimiterCore>, entity: RequestEntity, error: Error) {
    warn!(
        url = %entity.url,
        attempt = entity.attempt,
        %error,
        "request attempt failed"
    );
    if error.is_retryable() {
        requeue(core, entity, Some(error)).await;
    } else {
        entity.reject(error);
    }
}

/// Re-enqueue an entity with `attempt + 1`, or reject it.
///
/// `exhausted` is the error to surface when the budget is spent: the
/// original failure for transport errors, or a synthesized max-attempts
/// error when `None` (handler-driven retries never surface the response
/// they retried on).
///
/// Retries go to the tail, not the head: a retrying request queues behind
/// work enqueued after its failure, so new work is not starved.
async fn requeue(core: &Arc<LimiterCore>, mut entity: RequestEntity, exhausted: Option<Error>) {
    let budget_left = entity
        .config
        .attempts
        .is_some_and(|max| entity.attempt < max);

    if budget_left {
        entity.attempt += 1;
        if let Some(interval) = entity.config.interval {
            if !interval.is_zero() {
                sleep(interval).await;
            }
        }
        debug!(url = %entity.url, attempt = entity.attempt, "requeueing request");
        core.state().queue.push_back(entity);
    } else {
        let error = exhausted.unwrap_or_else(|| Error::MaxAttemptsExceeded {
            attempts: entity.config.attempts.unwrap_or(entity.attempt),
        });
        entity.reject(error);
    }
}
