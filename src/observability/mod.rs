//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log lines
//!     → Metrics endpoint (Prometheus scrape)
//!     → traffic watch listeners (crate::traffic_watch) for per-request events
//! ```
//!
//! # Design Decisions
//! - Request ID flows through log spans (tower-http request-id layer)
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
