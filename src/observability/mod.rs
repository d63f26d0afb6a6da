//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Setup and dispatch produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch outcome counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (host, path, outcome)
//! - Metrics are cheap (atomic increments); recording without an exporter is a no-op

pub mod logging;
pub mod metrics;
