//! External interfaces of loggrep.
//!
//! - `http` - HTTP server with the grep and liveness endpoints
//! - `metrics` - process-wide counters exposed over HTTP

pub mod http;
pub mod metrics;

pub use http::serve_http;
pub use metrics::METRICS;
