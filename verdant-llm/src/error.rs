//! Assistant error types.

use thiserror::Error;
use verdant_core::metrics::FailureBucket;

/// Errors surfaced by [`AssistantClient::send_message`](crate::AssistantClient::send_message).
///
/// The variants carry enough context for a UI to pick its own wording; none
/// of them contain user-facing copy.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Missing credential, or the endpoint rejected the key.
    #[error("Assistant configuration error: {0}")]
    Config(String),

    /// The message was empty or whitespace-only.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The endpoint kept answering 429 until the backoff schedule ran out.
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimited {
        attempts: u32,
    },

    /// A 2xx response did not contain `candidates[0].content.parts[0].text`.
    #[error("Unexpected response format: {0}")]
    Format(String),

    /// Any other non-success status.
    #[error("API request failed with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api {
        status: u16,
        /// `error.message` from the response body, when present.
        message: Option<String>,
    },

    /// The transport kept failing until the backoff schedule ran out.
    #[error("Network failure after {attempts} attempts: {message}")]
    Network {
        attempts: u32,
        message: String,
    },
}

/// Fieldless discriminant of [`AssistantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Input,
    RateLimit,
    Format,
    Api,
    Network,
}

impl AssistantError {
    /// Which kind of failure this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Input(_) => ErrorKind::Input,
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::Format(_) => ErrorKind::Format,
            Self::Api { .. } => ErrorKind::Api,
            Self::Network { .. } => ErrorKind::Network,
        }
    }

    /// HTTP status associated with the failure, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether resubmitting the same message later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::RateLimit | ErrorKind::Network)
    }

    pub(crate) fn bucket(&self) -> FailureBucket {
        match self.kind() {
            ErrorKind::Config => FailureBucket::Config,
            ErrorKind::Input => FailureBucket::Input,
            ErrorKind::RateLimit => FailureBucket::RateLimit,
            ErrorKind::Format => FailureBucket::Format,
            ErrorKind::Api => FailureBucket::Api,
            ErrorKind::Network => FailureBucket::Network,
        }
    }
}

/// A single attempt failed below the HTTP layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The attempt exceeded its timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// No connection could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else the HTTP client reported.
    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}
