//! # Verdant Core Library
//!
//! Data and configuration shared by the Verdant sustainability assistant.
//!
//! - [`LocationIndex`] — the read-only table of Bay Area composting,
//!   recycling, workshop, and garden sites, loaded once at startup
//! - [`VerdantConfig`] — `verdant.toml` with defaults for every field
//! - [`metrics`] — lock-free counters with Prometheus text export
//!
//! Nothing in this crate performs I/O after startup; the request path lives
//! in `verdant-llm`.

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod index;
pub mod location;
pub mod metrics;

pub use config::VerdantConfig;
pub use error::VerdantError;
pub use index::LocationIndex;
pub use location::{Category, Coordinates, LocationRecord};
