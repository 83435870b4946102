//! # Metrics Module
//!
//! Prometheus export for the judge service, served at `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `emoji_judge_requests_total{status, verdict}` - `/judge` responses
//! - `emoji_judge_attempts_total{outcome}` - model attempts (`success`, `timeout`, `error`)
//!
//! **Histograms:**
//! - `emoji_judge_request_duration_seconds` - end-to-end `/judge` latency
//!
//! **Gauges:**
//! - `emoji_judge_ready` - 1 when the judge passed within the readiness window

pub mod handler;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::health::HealthTracker;
use std::time::Duration;

/// Owns the Prometheus handle and refreshes derived gauges before rendering.
pub struct MetricsCollector {
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(prometheus_handle: PrometheusHandle) -> Self {
        Self { prometheus_handle }
    }

    /// Set the readiness gauge from the tracker.
    pub fn update_ready_gauge(&self, health: &HealthTracker, window_ms: u64) {
        let ready = if health.is_ready(window_ms) { 1.0 } else { 0.0 };
        metrics::gauge!("emoji_judge_ready").set(ready);
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Record one `/judge` response.
pub fn record_judge_request(status: &'static str, verdict: &'static str, elapsed: Duration) {
    metrics::counter!("emoji_judge_requests_total", "status" => status, "verdict" => verdict)
        .increment(1);
    metrics::histogram!("emoji_judge_request_duration_seconds").record(elapsed.as_secs_f64());
}

/// Initialize the Prometheus exporter with judge latency buckets.
///
/// Buckets span 0.25s to 120s, covering five 30s attempts plus backoff.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("emoji_judge_request_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the global recorder, or build a detached handle if one is already
/// installed (e.g. when several servers share a test process).
pub fn metrics_handle() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
