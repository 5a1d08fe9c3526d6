use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::{LazyLock, Once};

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Cache counters
pub static CACHE_HITS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("dashboard_cache_hits_total", "Reads served from a fresh snapshot"),
        &["kind"],
    )
    .unwrap()
});

pub static CACHE_REFRESHES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dashboard_cache_refreshes_total",
            "Snapshots recomputed from the node",
        ),
        &["kind"],
    )
    .unwrap()
});

pub static CACHE_REFRESH_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dashboard_cache_refresh_failures_total",
            "Snapshot refreshes that failed",
        ),
        &["kind"],
    )
    .unwrap()
});

// Upstream metrics
pub static UPSTREAM_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dashboard_upstream_requests_total",
            "Requests sent to the Nuts node",
        ),
        &["endpoint", "outcome"],
    )
    .unwrap()
});

pub static UPSTREAM_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "dashboard_upstream_latency_seconds",
            "Nuts node request latency",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
    )
    .unwrap()
});

// Transaction walk counters
pub static PAGES_WALKED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "dashboard_transaction_pages_total",
        "Transaction pages fetched from the node",
    )
    .unwrap()
});

pub static ENVELOPES_SKIPPED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "dashboard_envelopes_skipped_total",
        "Transaction envelopes skipped for lacking a signing time",
    )
    .unwrap()
});

static REGISTER: Once = Once::new();

/// Register all metrics with the registry. Later calls are no-ops.
pub fn register_metrics() {
    REGISTER.call_once(register_all);
}

fn register_all() {
    REGISTRY.register(Box::new(CACHE_HITS.clone())).unwrap();
    REGISTRY.register(Box::new(CACHE_REFRESHES.clone())).unwrap();
    REGISTRY
        .register(Box::new(CACHE_REFRESH_FAILURES.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(UPSTREAM_REQUESTS.clone()))
        .unwrap();
    REGISTRY.register(Box::new(UPSTREAM_LATENCY.clone())).unwrap();
    REGISTRY.register(Box::new(PAGES_WALKED.clone())).unwrap();
    REGISTRY
        .register(Box::new(ENVELOPES_SKIPPED.clone()))
        .unwrap();
}

/// Encode the registry in the Prometheus text format.
pub fn metrics_output() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
