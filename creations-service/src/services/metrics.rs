//! Prometheus metrics for creations-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};
use std::future::Future;
use std::time::Instant;

/// Admission outcomes by operation and decision.
pub static ADMISSION_DECISIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "creations_admission_decisions_total",
        "Admission decisions by operation and outcome",
        &["operation", "decision"]
    )
    .expect("Failed to register admission_decisions_total")
});

/// Completed operations by outcome.
pub static OPERATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "creations_operations_total",
        "Admitted operations by outcome",
        &["operation", "status"]
    )
    .expect("Failed to register operations_total")
});

/// Upstream provider latency.
pub static PROVIDER_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "creations_provider_latency_seconds",
        "Upstream provider latency in seconds",
        &["provider"],
        vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("Failed to register provider_latency")
});

/// Upstream provider errors.
pub static PROVIDER_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "creations_provider_errors_total",
        "Upstream provider errors by type",
        &["provider", "error_type"]
    )
    .expect("Failed to register provider_errors_total")
});

/// Free usage increments that did not land.
pub static USAGE_RECORD_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "creations_usage_record_failures_total",
        "Free usage increments that failed or hit the limit",
        &["reason"]
    )
    .expect("Failed to register usage_record_failures_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "creations_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&ADMISSION_DECISIONS_TOTAL);
    Lazy::force(&OPERATIONS_TOTAL);
    Lazy::force(&PROVIDER_LATENCY);
    Lazy::force(&PROVIDER_ERRORS_TOTAL);
    Lazy::force(&USAGE_RECORD_FAILURES_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

/// Await an upstream call, recording its latency and any error.
pub async fn observe_provider<T, F>(
    provider: &str,
    call: F,
) -> Result<T, crate::services::providers::ProviderError>
where
    F: Future<Output = Result<T, crate::services::providers::ProviderError>>,
{
    let start = Instant::now();
    let result = call.await;

    PROVIDER_LATENCY
        .with_label_values(&[provider])
        .observe(start.elapsed().as_secs_f64());

    if let Err(e) = &result {
        PROVIDER_ERRORS_TOTAL
            .with_label_values(&[provider, e.error_type()])
            .inc();
        tracing::warn!(provider = provider, error = %e, "Upstream provider call failed");
    }

    result
}
