use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub permission_fetch_total: IntCounterVec,
    pub backend_requests_total: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;
        let permission_fetch_total = IntCounterVec::new(
            Opts::new(
                "permission_fetch_total",
                "Session permission fetches by outcome",
            ),
            &["outcome"],
        )?;
        let backend_requests_total = IntCounterVec::new(
            Opts::new(
                "backend_requests_total",
                "Calls to the PMS backend and auth provider",
            ),
            &["operation", "outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(permission_fetch_total.clone()))?;
        registry.register(Box::new(backend_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            permission_fetch_total,
            backend_requests_total,
        })
    }
}

/// Create the process-wide registry. Calling it again returns the existing one.
pub fn init_metrics() -> prometheus::Result<&'static Metrics> {
    if let Some(metrics) = METRICS.get() {
        return Ok(metrics);
    }
    let metrics = Metrics::new()?;
    Ok(METRICS.get_or_init(|| metrics))
}

/// The registry, if [`init_metrics`] has run. Recording is skipped otherwise.
pub fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

pub fn record_backend_call(operation: &str, outcome: &str) {
    if let Some(m) = metrics() {
        m.backend_requests_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
}

pub fn record_permission_fetch(outcome: &str) {
    if let Some(m) = metrics() {
        m.permission_fetch_total.with_label_values(&[outcome]).inc();
    }
}

/// Text exposition of every registered metric.
pub fn get_metrics() -> anyhow::Result<String> {
    let metrics = init_metrics().map_err(|e| anyhow::anyhow!("metrics registry: {}", e))?;
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metrics.registry.gather(), &mut buffer)
        .map_err(|e| anyhow::anyhow!("failed to encode metrics: {}", e))?;
    Ok(String::from_utf8(buffer)?)
}
