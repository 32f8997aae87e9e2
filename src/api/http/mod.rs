//! HTTP API server module.
//!
//! Provides:
//! - Liveness probe at `/ping`
//! - Grep API at `/v1/grep` (plus the legacy `/grep` alias)
//! - JSON metrics at `/api/metrics`
//! - Prometheus metrics at `/metrics`

pub mod auth;
mod handlers;
mod router;

pub use router::{serve_http, serve_on, ServerContext};
