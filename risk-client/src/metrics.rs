//! Risk client metrics

use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static::lazy_static! {
    /// Remote calls by operation and outcome
    pub static ref REMOTE_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "risk_remote_requests_total",
        "Remote risk-intelligence requests by outcome",
        &["operation", "outcome"]
    )
    .expect("metric can be created");

    /// Remote call latency by operation
    pub static ref REMOTE_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "risk_remote_request_duration_seconds",
        "Remote risk-intelligence request duration",
        &["operation"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("metric can be created");

    /// Generated results by operation and reason
    pub static ref MOCK_RESULTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "risk_mock_results_total",
        "Results served by the deterministic generator",
        &["operation", "reason"]
    )
    .expect("metric can be created");
}

/// Record a remote call outcome
pub fn record_remote(operation: &str, outcome: &str, seconds: f64) {
    REMOTE_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    REMOTE_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}

/// Record a generated result and why it was generated
pub fn record_mock(operation: &str, reason: &str) {
    MOCK_RESULTS_TOTAL
        .with_label_values(&[operation, reason])
        .inc();
}

/// Encode the default registry in the text exposition format
pub fn render() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
