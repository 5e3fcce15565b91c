//! Prometheus metrics for the account directory.
//!
//! - Listing requests by outcome, and listing latency
//! - Notification dispatch decisions
//! - Notification task outcomes by task kind
//!
//! # Example
//! ```no_run
//! use helpdesk_directory::metrics::LISTING_REQUESTS_TOTAL;
//!
//! LISTING_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};

const NAMESPACE: &str = "helpdesk_directory";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Listing requests
    ///
    /// Labels: outcome (ok, validation_error, search_unavailable, search_query_error)
    pub static ref LISTING_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("listing_requests_total", "Total number of account listing requests")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create LISTING_REQUESTS_TOTAL metric");

    /// Listing latency in seconds, excluding notification side effects
    pub static ref LISTING_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "listing_duration_seconds",
            "Account listing duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
    ).expect("Failed to create LISTING_DURATION_SECONDS metric");

    /// Dispatcher hand-off decisions
    ///
    /// Labels: decision (skipped, scheduled, dropped)
    pub static ref NOTIFICATION_DISPATCH_TOTAL: CounterVec = CounterVec::new(
        Opts::new("notification_dispatch_total", "Notification dispatch decisions")
            .namespace(NAMESPACE),
        &["decision"]
    ).expect("Failed to create NOTIFICATION_DISPATCH_TOTAL metric");

    /// Notification task outcomes
    ///
    /// Labels: task (email, broadcast), outcome (completed, failed)
    pub static ref NOTIFICATION_TASKS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("notification_tasks_total", "Notification task outcomes")
            .namespace(NAMESPACE),
        &["task", "outcome"]
    ).expect("Failed to create NOTIFICATION_TASKS_TOTAL metric");
}

/// Register all metrics with the registry
///
/// # Errors
///
/// Fails if called more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(LISTING_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LISTING_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(NOTIFICATION_DISPATCH_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(NOTIFICATION_TASKS_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
