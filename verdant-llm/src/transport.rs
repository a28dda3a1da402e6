//! The single-attempt network seam.
//!
//! [`Transport`] performs exactly one outbound call and reports what came
//! back. Retrying and pacing live above it in
//! [`RetryingTransport`](crate::retry::RetryingTransport), so test doubles only
//! have to script responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::types::GenerateRequest;

/// Everything needed to perform one call.
#[derive(Clone)]
pub struct OutboundRequest {
    /// Endpoint URL without the credential.
    pub url: String,
    /// Sent as the `key` query parameter.
    pub api_key: String,
    pub body: GenerateRequest,
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("body", &self.body)
            .finish()
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server asked us to slow down.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Performs one outbound call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once.
    ///
    /// Non-2xx statuses are returned as `Ok`; `Err` means no HTTP response
    /// was obtained at all. Once a status line has arrived the result is
    /// `Ok`, even if the body could not be read (the body is then empty).
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with a per-attempt timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let resp = self
            .http
            .post(&request.url)
            .query(&[("key", request.api_key.as_str())])
            .json(&request.body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status().as_u16();
        // The server has answered; from here on nothing is a transport error.
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status, error = %e, "Failed to read response body");
                String::new()
            }
        };
        debug!(status, bytes = body.len(), "Generation endpoint responded");
        Ok(RawResponse { status, body })
    }
}
