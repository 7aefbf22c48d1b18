//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_probe_total` (counter): probes by backend, outcome
//! - `router_probe_latency_ms` (histogram): probe latency per backend
//! - `router_backend_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `router_backend_consecutive_failures` (gauge)
//! - `router_probe_cycles_total` / `router_probe_cycle_duration_ms`
//! - `router_probe_cycle_panics_total` (counter): cycles or probes that panicked
//! - `router_fallback_events_total` (counter): by reason, source
//! - `router_resolutions_total` (counter): primary | fallback | unavailable
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(backend: &str, ok: bool, latency_ms: Option<u64>) {
    let outcome = if ok { "success" } else { "failure" };
    counter!("router_probe_total", "backend" => backend.to_string(), "outcome" => outcome)
        .increment(1);
    if let Some(latency) = latency_ms {
        histogram!("router_probe_latency_ms", "backend" => backend.to_string())
            .record(latency as f64);
    }
}

pub fn record_backend_health(backend: &str, healthy: bool, consecutive_failures: u32) {
    gauge!("router_backend_healthy", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
    gauge!("router_backend_consecutive_failures", "backend" => backend.to_string())
        .set(f64::from(consecutive_failures));
}

pub fn record_cycle(duration: Duration) {
    counter!("router_probe_cycles_total").increment(1);
    histogram!("router_probe_cycle_duration_ms").record(duration.as_secs_f64() * 1000.0);
}

pub fn record_cycle_panic() {
    counter!("router_probe_cycle_panics_total").increment(1);
}

pub fn record_fallback(reason: &'static str, source: &'static str) {
    counter!("router_fallback_events_total", "reason" => reason, "source" => source).increment(1);
}

pub fn record_resolution(outcome: &'static str) {
    counter!("router_resolutions_total", "outcome" => outcome).increment(1);
}
