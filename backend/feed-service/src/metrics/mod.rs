//! Prometheus metrics for the feed path, keyed by mode and bucket.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Total feed requests segmented by selected mode.
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_requests_total",
        "Total feed requests segmented by composition mode",
        &["mode"]
    )
    .expect("failed to register feed_requests_total");

    /// Duration of feed composition segmented by mode.
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_request_duration_seconds",
        "Feed composition duration segmented by mode",
        &["mode"]
    )
    .expect("failed to register feed_request_duration_seconds");

    /// Bucket fetches that failed and were degraded to empty.
    pub static ref FEED_BUCKET_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_bucket_failures_total",
        "Bucket fetches degraded to empty, segmented by mode and bucket",
        &["mode", "bucket"]
    )
    .expect("failed to register feed_bucket_failures_total");

    /// Candidates fetched per bucket before truncation.
    pub static ref FEED_BUCKET_FILL: HistogramVec = register_histogram_vec!(
        "feed_bucket_fill",
        "Candidates fetched per bucket before truncation, segmented by mode and bucket",
        &["mode", "bucket"]
    )
    .expect("failed to register feed_bucket_fill");
}

/// Render the default registry in the Prometheus text exposition format.
pub fn export() -> String {
    let encoder = TextEncoder::new();
    encoder
        .encode_to_string(&prometheus::gather())
        .unwrap_or_default()
}
