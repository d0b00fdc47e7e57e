//! clipfetch server library: HTTP surface over the core job pipeline.
//!
//! Exposed as a library so integration tests can drive the router
//! in-process with mock capabilities.

pub mod api;
pub mod metrics;
pub mod state;
