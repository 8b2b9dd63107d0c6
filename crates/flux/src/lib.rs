//! Client for the asynchronous generation service (Flux Kontext).
//!
//! Provides job submission, a single-step poll relay that materializes
//! finished samples as inline assets, an optional cache of ready results,
//! and a caller-side poll driver.

pub mod api;
pub mod cache;
pub mod error;
pub mod poller;
pub mod relay;
