//! Runtime counters for the assistant.
//!
//! Lock-free `AtomicU64` counters incremented on the request path and read
//! when exporting. `to_prometheus` renders the text exposition format so a
//! host service can serve it as-is.

use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Which failure bucket a surfaced error lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureBucket {
    Config,
    Input,
    RateLimit,
    Format,
    Api,
    Network,
}

/// Atomic counters for assistant traffic.
pub struct AssistantCounters {
    /// Messages handed to the assistant.
    pub messages_received: AtomicU64,
    /// Outbound requests actually put on the wire.
    pub dispatches: AtomicU64,
    /// Retries caused by HTTP 429.
    pub retries_rate_limited: AtomicU64,
    /// Retries caused by transport failures.
    pub retries_network: AtomicU64,
    /// Times the rate limiter had to suspend a caller.
    pub rate_limiter_waits: AtomicU64,
    /// Answers that received appended location facts.
    pub augmentations: AtomicU64,
    failures: [AtomicU64; 6],
}

impl AssistantCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            dispatches: AtomicU64::new(0),
            retries_rate_limited: AtomicU64::new(0),
            retries_network: AtomicU64::new(0),
            rate_limiter_waits: AtomicU64::new(0),
            augmentations: AtomicU64::new(0),
            failures: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
        }
    }

    /// Count one surfaced failure.
    pub fn record_failure(&self, bucket: FailureBucket) {
        self.failures[bucket as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        let failure = |b: FailureBucket| self.failures[b as usize].load(Ordering::Relaxed);
        CounterSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            retries_rate_limited: self.retries_rate_limited.load(Ordering::Relaxed),
            retries_network: self.retries_network.load(Ordering::Relaxed),
            rate_limiter_waits: self.rate_limiter_waits.load(Ordering::Relaxed),
            augmentations: self.augmentations.load(Ordering::Relaxed),
            failures: FailureCounts {
                config: failure(FailureBucket::Config),
                input: failure(FailureBucket::Input),
                rate_limit: failure(FailureBucket::RateLimit),
                format: failure(FailureBucket::Format),
                api: failure(FailureBucket::Api),
                network: failure(FailureBucket::Network),
            },
        }
    }
}

impl Default for AssistantCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssistantCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.snapshot(), f)
    }
}

/// Surfaced failures per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub config: u64,
    pub input: u64,
    pub rate_limit: u64,
    pub format: u64,
    pub api: u64,
    pub network: u64,
}

impl FailureCounts {
    /// Sum over every bucket.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.config + self.input + self.rate_limit + self.format + self.api + self.network
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub messages_received: u64,
    pub dispatches: u64,
    pub retries_rate_limited: u64,
    pub retries_network: u64,
    pub rate_limiter_waits: u64,
    pub augmentations: u64,
    pub failures: FailureCounts,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP verdant_messages_received_total Messages handed to the assistant\n\
             # TYPE verdant_messages_received_total counter\n\
             verdant_messages_received_total {}\n\
             # HELP verdant_dispatches_total Outbound requests sent\n\
             # TYPE verdant_dispatches_total counter\n\
             verdant_dispatches_total {}\n\
             # HELP verdant_retries_total Retries by cause\n\
             # TYPE verdant_retries_total counter\n\
             verdant_retries_total{{cause=\"rate_limited\"}} {}\n\
             verdant_retries_total{{cause=\"network\"}} {}\n\
             # HELP verdant_rate_limiter_waits_total Callers suspended by the rate limiter\n\
             # TYPE verdant_rate_limiter_waits_total counter\n\
             verdant_rate_limiter_waits_total {}\n\
             # HELP verdant_augmentations_total Answers with appended locations\n\
             # TYPE verdant_augmentations_total counter\n\
             verdant_augmentations_total {}\n\
             # HELP verdant_failures_total Surfaced failures by kind\n\
             # TYPE verdant_failures_total counter\n\
             verdant_failures_total{{kind=\"config\"}} {}\n\
             verdant_failures_total{{kind=\"input\"}} {}\n\
             verdant_failures_total{{kind=\"rate_limit\"}} {}\n\
             verdant_failures_total{{kind=\"format\"}} {}\n\
             verdant_failures_total{{kind=\"api\"}} {}\n\
             verdant_failures_total{{kind=\"network\"}} {}\n",
            self.messages_received,
            self.dispatches,
            self.retries_rate_limited,
            self.retries_network,
            self.rate_limiter_waits,
            self.augmentations,
            self.failures.config,
            self.failures.input,
            self.failures.rate_limit,
            self.failures.format,
            self.failures.api,
            self.failures.network,
        )
    }
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing` spans on the request path.
pub mod spans {
    /// One `send_message` call, end to end.
    pub const SEND_MESSAGE: &str = "verdant::assistant::send";
    /// One attempt on the wire.
    pub const DISPATCH: &str = "verdant::transport::dispatch";
    /// Location augmentation.
    pub const AUGMENT: &str = "verdant::augment";
}
