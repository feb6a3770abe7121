//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (per-request span with the request ID)
//!
//! Consumers:
//!     → stdout (plain or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the span of every request
//! - Metric updates are cheap and safe to call without an exporter installed

pub mod logging;
pub mod metrics;
pub mod tracing;
