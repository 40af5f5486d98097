//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec, Encoder,
    HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records one admission decision with its outcome and duration.
    /// Results are "admitted", "conflict", "rejected", or "fault".
    fn record_admission(&self, result: &str, duration_secs: f64);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    admission_requests_total: CounterVec,
    admission_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Creates a new metrics instance with a Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let admission_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "admission_requests_total",
                "Total number of requests through the admission stage"
            ),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register admission_requests_total");

        let admission_duration_seconds = register_histogram_vec_with_registry!(
            "admission_duration_seconds",
            "Admission stage duration in seconds",
            &["result"],
            vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
            ],
            registry.clone()
        )
        .expect("Failed to register admission_duration_seconds");

        Metrics {
            registry,
            admission_requests_total,
            admission_duration_seconds,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_admission(&self, result: &str, duration_secs: f64) {
        self.admission_requests_total
            .with_label_values(&[result])
            .inc();
        self.admission_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_admissions_show_up_in_rendered_output() {
        let metrics = Metrics::new();
        metrics.record_admission("admitted", 0.002);
        metrics.record_admission("rejected", 0.001);

        let rendered = metrics.render();
        assert!(rendered.contains("admission_requests_total"));
        assert!(rendered.contains("result=\"admitted\""));
        assert!(rendered.contains("result=\"rejected\""));
    }
}
