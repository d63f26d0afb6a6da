//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_router_dispatch_total` (counter): dispatch decisions by `outcome`
//!   (`dedicated`, `generic`, `rejected`, `passthrough`)

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const DISPATCH_TOTAL: &str = "host_router_dispatch_total";

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    metrics::describe_counter!(DISPATCH_TOTAL, "Dispatch decisions by outcome");
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_dispatch(outcome: &'static str) {
    metrics::counter!(DISPATCH_TOTAL, "outcome" => outcome).increment(1);
}
