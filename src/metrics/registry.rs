use lazy_static::lazy_static;
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};
use tracing::warn;

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_or_detached(
        IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "status"]
        )
        .expect("valid metric definition")
    );

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_or_detached(
        HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration in seconds")
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["method"]
        )
        .expect("valid metric definition")
    );

    // Error mapping
    pub static ref ERRORS_MAPPED_TOTAL: IntCounterVec = register_or_detached(
        IntCounterVec::new(
            Opts::new("errors_mapped_total", "Total failures translated into error responses"),
            &["kind", "status"]  // kind: constraint_violation, invalid_body, body_rejected, common, internal, panic, framework
        )
        .expect("valid metric definition")
    );
}

/// Register `collector` with the default registry.
///
/// A name clash with a collector registered elsewhere in the process is logged
/// and the collector is returned unregistered: it still counts, it just is not
/// exported by `/metrics`.
fn register_or_detached<C>(collector: C) -> C
where
    C: Collector + Clone + 'static,
{
    if let Err(e) = prometheus::register(Box::new(collector.clone())) {
        warn!("Metric registration failed, collector will not be exported: {}", e);
    }
    collector
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&ERRORS_MAPPED_TOTAL);
}
