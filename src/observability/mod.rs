//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::server
//!     → logging.rs (tracing subscriber, per-request spans with request IDs)
//!     → metrics.rs (counters and latency histogram, optional Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
