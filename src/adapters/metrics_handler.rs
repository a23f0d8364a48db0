use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Inbound
    pub requests_total: CounterVec,

    // Upstream
    pub upstream_requests_total: CounterVec,
    pub upstream_duration: HistogramVec,
    pub auth_failures_total: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("search_agent_requests_total", "Total number of inbound requests"),
            &["route", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let upstream_requests_total = CounterVec::new(
            Opts::new(
                "search_agent_upstream_requests_total",
                "Total Discovery Engine calls",
            ),
            &["operation", "status"],
        )?;
        registry.register(Box::new(upstream_requests_total.clone()))?;

        let upstream_duration = HistogramVec::new(
            HistogramOpts::new(
                "search_agent_upstream_duration_seconds",
                "Discovery Engine call duration in seconds",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(upstream_duration.clone()))?;

        let auth_failures_total = CounterVec::new(
            Opts::new(
                "search_agent_auth_failures_total",
                "Failed access token acquisitions",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(auth_failures_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            upstream_requests_total,
            upstream_duration,
            auth_failures_total,
        })
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }

    pub async fn metrics(&self) -> String {
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }
}
