//! Fixed backoff-and-retry around a single [`Transport`].
//!
//! Every attempt first passes through the shared [`RateLimiter`]. A 429 or a
//! transport failure is retried after the next delay of
//! [`BACKOFF_SCHEDULE`]; once the schedule is exhausted the last 429 response
//! (or the last transport error) is handed back to the caller. Any other
//! status is returned immediately.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{Instrument, debug, debug_span, warn};
use verdant_core::metrics::{AssistantCounters, spans};

use crate::error::TransportError;
use crate::rate_limit::RateLimiter;
use crate::transport::{OutboundRequest, RawResponse, Transport};

/// Delays before the first, second, and third retry. No jitter.
pub const BACKOFF_SCHEDULE: [Duration; 3] = [
    Duration::from_millis(2000),
    Duration::from_millis(4000),
    Duration::from_millis(8000),
];

/// Attempts made before giving up: the first try plus one per delay.
pub const MAX_ATTEMPTS: u32 = BACKOFF_SCHEDULE.len() as u32 + 1;

/// Sum of the backoff schedule (14 s).
#[must_use]
pub fn total_backoff() -> Duration {
    BACKOFF_SCHEDULE.iter().sum()
}

/// Transport wrapper that paces and retries.
#[derive(Clone)]
pub struct RetryingTransport {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    counters: Arc<AssistantCounters>,
}

impl RetryingTransport {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        counters: Arc<AssistantCounters>,
    ) -> Self {
        Self {
            transport,
            limiter,
            counters,
        }
    }

    /// The limiter every attempt goes through.
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Perform `request`, retrying 429s and transport failures.
    ///
    /// # Errors
    /// Returns the last `TransportError` once all [`MAX_ATTEMPTS`] attempts
    /// failed below the HTTP layer.
    pub async fn execute(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let mut attempt = 0usize;
        loop {
            if !self.limiter.acquire().await.is_zero() {
                self.counters.rate_limiter_waits.fetch_add(1, Ordering::Relaxed);
            }
            self.counters.dispatches.fetch_add(1, Ordering::Relaxed);
            debug!(attempt = attempt + 1, max = MAX_ATTEMPTS, "Dispatching generation request");

            let delay = BACKOFF_SCHEDULE.get(attempt).copied();
            let outcome = self
                .transport
                .send(request)
                .instrument(debug_span!(spans::DISPATCH, attempt = attempt + 1))
                .await;
            match (outcome, delay) {
                (Ok(resp), Some(delay)) if resp.is_rate_limited() => {
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        attempt = attempt + 1,
                        "Rate limit hit, retrying"
                    );
                    self.counters.retries_rate_limited.fetch_add(1, Ordering::Relaxed);
                    sleep(delay).await;
                }
                (Ok(resp), _) => return Ok(resp),
                (Err(e), Some(delay)) => {
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, retrying"
                    );
                    self.counters.retries_network.fetch_add(1, Ordering::Relaxed);
                    sleep(delay).await;
                }
                (Err(e), None) => return Err(e),
            }
            attempt += 1;
        }
    }
}
