//! Minimum spacing between outbound dispatches.
//!
//! A [`RateLimiter`] records when the last dispatch was released. Checking
//! the gap and recording `now` happen in one `parking_lot::Mutex` critical
//! section; a caller that is too early drops the lock, sleeps until the gap
//! would be satisfied, and checks again. The stored time is always the
//! moment a caller actually proceeded, so a task that resumes late pushes
//! everyone behind it back instead of eating into their spacing.
//!
//! Callers are not served in arrival order: whichever waiter re-checks first
//! after the gap elapses wins. Share one limiter (behind an `Arc`) between
//! every client that talks to the same endpoint; the spacing only holds
//! among callers of one instance.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Default spacing between dispatches.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

/// Process-wide dispatch gate.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    /// When the most recent dispatch was released. Written only by `acquire`.
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter that has not admitted anything yet.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Configured spacing.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// When the last dispatch was released.
    #[must_use]
    pub fn last_dispatch(&self) -> Option<Instant> {
        *self.last_dispatch.lock()
    }

    /// Wait until the caller may dispatch, then record the dispatch time.
    ///
    /// Returns how long the caller was suspended (zero when enough time had
    /// already passed).
    pub async fn acquire(&self) -> Duration {
        let start = Instant::now();
        loop {
            let ready_at = {
                let mut last = self.last_dispatch.lock();
                let now = Instant::now();
                match *last {
                    Some(prev) if prev + self.min_interval > now => prev + self.min_interval,
                    _ => {
                        *last = Some(now);
                        return now - start;
                    }
                }
            };
            debug!(
                wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                "Rate limiter delaying dispatch"
            );
            sleep_until(ready_at).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
