use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, histogram_opts, register_histogram, register_histogram_vec,
    register_int_counter, register_int_counter_vec, register_int_gauge, Histogram, HistogramVec,
    IntCounter, IntCounterVec, IntGauge,
};

pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "onewhat_requests_total",
        "Total number of HTTP requests by status code",
        &["status"]
    )
    .unwrap()
});

pub static ACTIVE_REQUESTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("onewhat_active_requests", "Current active requests").unwrap()
});

pub static LATENCY: Lazy<Histogram> = Lazy::new(|| {
    let opts = histogram_opts!(
        "onewhat_latency_seconds",
        "End-to-end latency in seconds",
        exponential_buckets(0.01, 2.0, 15).unwrap()
    );
    register_histogram!(opts).unwrap()
});

pub static UPSTREAM_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "onewhat_upstream_calls_total",
        "Calls to the inference service by operation and outcome",
        &["operation", "outcome"]
    )
    .unwrap()
});

pub static UPSTREAM_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = histogram_opts!(
        "onewhat_upstream_latency_seconds",
        "Inference call latency in seconds",
        exponential_buckets(0.05, 2.0, 12).unwrap()
    );
    register_histogram_vec!(opts, &["operation"]).unwrap()
});

pub static TRANSLATION_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "onewhat_translation_fallbacks_total",
        "Translations retried on the fallback model"
    )
    .unwrap()
});

/// Records one finished upstream call.
pub fn observe_upstream(operation: &str, outcome: &str, elapsed_secs: f64) {
    UPSTREAM_CALLS
        .with_label_values(&[operation, outcome])
        .inc();
    UPSTREAM_LATENCY
        .with_label_values(&[operation])
        .observe(elapsed_secs);
}
