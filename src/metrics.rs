use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Histogram, TextEncoder, register_counter, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("gateway_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("gateway_cache_misses_total", "Total cache misses").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter = register_counter!(
        "gateway_upstream_failures_total",
        "Total failed generation calls"
    )
    .unwrap();
    pub static ref GENERATION_LATENCY: Histogram = register_histogram!(
        "gateway_generation_latency_seconds",
        "Generation call latency in seconds"
    )
    .unwrap();
}

// Render every registered metric in the Prometheus text format
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("Metrics are not valid UTF-8: {}", e))
}
