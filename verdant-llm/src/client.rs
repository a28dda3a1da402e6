//! Assistant client — the public `send_message` entry point.
//!
//! Flow per call: validate configuration and input, pace through the
//! [`RateLimiter`], dispatch with retries, classify the final status, extract
//! the answer text, and append location facts.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{Instrument, debug, debug_span, error};
use verdant_core::config::{AssistantConfig, VerdantConfig};
use verdant_core::metrics::{AssistantCounters, CounterSnapshot, spans};
use verdant_core::LocationIndex;

use crate::augment::ResponseAugmenter;
use crate::error::AssistantError;
use crate::rate_limit::RateLimiter;
use crate::retry::{MAX_ATTEMPTS, RetryingTransport, total_backoff};
use crate::transport::{HttpTransport, OutboundRequest, RawResponse, Transport};
use crate::types::{GenerateRequest, error_message, extract_text};

/// Talks to the generation endpoint on behalf of the in-page assistant.
///
/// # Latency
///
/// A call that keeps hitting 429s or transport failures waits through the
/// whole backoff schedule (2 s + 4 s + 8 s = 14 s), performs up to four
/// round trips, and may additionally wait on the shared rate limiter before
/// each attempt. There is no cancellation once a call has started.
pub struct AssistantClient {
    config: AssistantConfig,
    api_key: Option<String>,
    transport: RetryingTransport,
    augmenter: ResponseAugmenter,
    counters: Arc<AssistantCounters>,
}

impl AssistantClient {
    /// Create a client over an arbitrary transport with its own rate limiter.
    ///
    /// The API key is resolved from `config` once, here.
    #[must_use]
    pub fn new(config: &VerdantConfig, index: LocationIndex, transport: Arc<dyn Transport>) -> Self {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            config.assistant.min_request_interval_ms,
        )));
        Self::with_rate_limiter(config, index, transport, limiter)
    }

    /// Create a client sharing `limiter` with other clients.
    #[must_use]
    pub fn with_rate_limiter(
        config: &VerdantConfig,
        index: LocationIndex,
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let counters = Arc::new(AssistantCounters::new());
        Self {
            api_key: config.assistant.resolve_api_key(),
            config: config.assistant.clone(),
            transport: RetryingTransport::new(transport, limiter, Arc::clone(&counters)),
            augmenter: ResponseAugmenter::new(index, &config.augmentation),
            counters,
        }
    }

    /// Create a client that talks HTTP through `reqwest`.
    #[must_use]
    pub fn http(config: &VerdantConfig, index: LocationIndex) -> Self {
        let transport = HttpTransport::new(Duration::from_millis(
            config.assistant.request_timeout_ms,
        ));
        Self::new(config, index, Arc::new(transport))
    }

    /// Longest time a single call can spend in backoff sleeps.
    #[must_use]
    pub fn worst_case_backoff() -> Duration {
        total_backoff()
    }

    /// Whether a credential is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The limiter pacing this client's dispatches.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        self.transport.limiter()
    }

    #[must_use]
    pub fn augmenter(&self) -> &ResponseAugmenter {
        &self.augmenter
    }

    /// Current counter values.
    #[must_use]
    pub fn metrics(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Send `message` to the model and return the (possibly augmented) answer.
    ///
    /// # Errors
    /// - `Config` when no API key is configured or the endpoint rejects it
    /// - `Input` when `message` is blank
    /// - `RateLimited` when 429s outlast the backoff schedule
    /// - `Network` when transport failures outlast the backoff schedule
    /// - `Api` for any other non-success status
    /// - `Format` when a success body lacks the answer text
    pub async fn send_message(&self, message: &str) -> Result<String, AssistantError> {
        self.counters.messages_received.fetch_add(1, Ordering::Relaxed);
        let span = debug_span!(spans::SEND_MESSAGE, chars = message.chars().count());
        let result = self.send_inner(message).instrument(span).await;
        if let Err(e) = &result {
            self.counters.record_failure(e.bucket());
        }
        result
    }

    async fn send_inner(&self, message: &str) -> Result<String, AssistantError> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(AssistantError::Config(format!(
                "no API key configured (set assistant.api_key or ${})",
                self.config.api_key_env
            )));
        };
        if message.trim().is_empty() {
            return Err(AssistantError::Input("message cannot be empty".to_string()));
        }

        let request = OutboundRequest {
            url: self.config.endpoint.clone(),
            api_key,
            body: GenerateRequest::new(message, &self.config),
        };

        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| AssistantError::Network {
                attempts: MAX_ATTEMPTS,
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(classify_failure(&response));
        }

        let text = extract_text(&response.body)?;
        debug!(chars = text.chars().count(), "Model answered");
        Ok(self
            .augmenter
            .augment_counted(message, &text, &self.counters))
    }
}

/// Map a final non-success response to an error.
fn classify_failure(response: &RawResponse) -> AssistantError {
    let message = error_message(&response.body);
    error!(
        status = response.status,
        body = %response.body,
        "Generation endpoint returned an error"
    );

    match response.status {
        429 => AssistantError::RateLimited {
            attempts: MAX_ATTEMPTS,
        },
        400 if message
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains("api key")) =>
        {
            AssistantError::Config(format!(
                "invalid or expired API key: {}",
                message.unwrap_or_default()
            ))
        }
        status => AssistantError::Api { status, message },
    }
}
