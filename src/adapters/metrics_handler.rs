use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Submission metrics
    pub submissions_total: CounterVec,
    pub webhook_dispatch_total: CounterVec,

    // Configuration metrics
    pub config_resolutions_total: CounterVec,
    pub forms_saved_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let submissions_total = CounterVec::new(
            Opts::new("leadform_submissions_total", "Form submission attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let webhook_dispatch_total = CounterVec::new(
            Opts::new("leadform_webhook_dispatch_total", "Webhook deliveries by result"),
            &["result"],
        )?;
        registry.register(Box::new(webhook_dispatch_total.clone()))?;

        let config_resolutions_total = CounterVec::new(
            Opts::new(
                "leadform_config_resolutions_total",
                "Embed configuration resolutions by source",
            ),
            &["source"],
        )?;
        registry.register(Box::new(config_resolutions_total.clone()))?;

        let forms_saved_total = Counter::new("leadform_forms_saved_total", "Form configurations saved")?;
        registry.register(Box::new(forms_saved_total.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            webhook_dispatch_total,
            config_resolutions_total,
            forms_saved_total,
        })
    }

    pub fn record_submission(&self, outcome: &str) {
        self.submissions_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_resolution(&self, source: &str) {
        self.config_resolutions_total.with_label_values(&[source]).inc();
    }

    pub fn record_dispatch(&self, result: &str) {
        self.webhook_dispatch_total.with_label_values(&[result]).inc();
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
