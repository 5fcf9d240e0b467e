//! # Metrics
//!
//! Prometheus export for the `GET /metrics` endpoint.
//!
//! **Counters:**
//! - `scribe_requests_total{status}` - Score requests by HTTP status
//! - `scribe_upstream_calls_total{outcome}` - Upstream calls by classified outcome
//!
//! **Histograms:**
//! - `scribe_dispatch_duration_seconds` - Time spent in one dispatch, all attempts included
//!
//! **Gauges:**
//! - `scribe_credentials` - Credentials loaded into the pool

pub mod handler;

pub use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder with dispatch latency buckets.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("scribe_dispatch_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the recorder, or fall back to a detached one if a recorder is
/// already installed (tests build many app states per process).
pub fn metrics_handle() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handle_can_be_requested_twice() {
        let first = metrics_handle();
        let second = metrics_handle();
        // Both handles render without panicking, even if only one is global.
        let _ = first.render();
        let _ = second.render();
    }
}
