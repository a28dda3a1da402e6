//! # verdant-llm — Assistant Client for Verdant
//!
//! Calls a hosted text-generation endpoint on behalf of the in-page
//! sustainability assistant and enriches the answers with local facts.
//!
//! All outbound traffic goes through this crate, ensuring:
//!   - A minimum spacing between dispatches, shared by every caller
//!   - Fixed 2 s / 4 s / 8 s backoff on 429 and transport failures
//!   - Typed failures the UI can map to its own wording
//!   - Location facts appended to location-flavoured answers
//!
//! # Architecture
//!
//! ```text
//! send_message(text)
//!   └─ validate key + input
//!        └─ RetryingTransport ──► RateLimiter::acquire ──► Transport::send
//!             (retry 429 / transport errors on the fixed schedule)
//!        └─ classify status, extract candidates[0].content.parts[0].text
//!        └─ ResponseAugmenter::augment(query, text)
//! ```
//!
//! A call can spend up to 14 s in backoff alone, plus up to four round trips
//! and any rate-limiter waits; see [`AssistantClient`].

pub mod augment;
pub mod client;
pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod template;
pub mod transport;
pub mod types;

pub use augment::ResponseAugmenter;
pub use client::AssistantClient;
pub use error::{AssistantError, ErrorKind, TransportError};
pub use rate_limit::RateLimiter;
pub use retry::{BACKOFF_SCHEDULE, MAX_ATTEMPTS, RetryingTransport};
pub use transport::{HttpTransport, OutboundRequest, RawResponse, Transport};
pub use types::GenerateRequest;
