use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::metrics_handler::MetricsCollector;
use crate::config::WebhookSettings;
use crate::domain::error::WebhookError;
use crate::domain::form::SubmissionPayload;
use crate::domain::WebhookPort;

/// Delivers submissions as a JSON POST
pub struct HttpWebhookClient {
    client: Client,
}

impl HttpWebhookClient {
    pub fn new(settings: &WebhookSettings) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookPort for HttpWebhookClient {
    async fn dispatch(&self, url: &str, payload: &SubmissionPayload) -> Result<(), WebhookError> {
        // Any response counts as delivered; the receiver's status is not inspected
        let response = self.client.post(url).json(payload).send().await?;
        tracing::debug!("Webhook {} answered {}", url, response.status());
        Ok(())
    }
}

/// Counts delivery results before handing them back to the session
pub struct MeteredWebhook {
    inner: Arc<dyn WebhookPort>,
    metrics: Arc<MetricsCollector>,
}

impl MeteredWebhook {
    pub fn new(inner: Arc<dyn WebhookPort>, metrics: Arc<MetricsCollector>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl WebhookPort for MeteredWebhook {
    async fn dispatch(&self, url: &str, payload: &SubmissionPayload) -> Result<(), WebhookError> {
        let result = self.inner.dispatch(url, payload).await;
        let label = match &result {
            Ok(()) => "delivered",
            Err(WebhookError::Timeout) => "timeout",
            Err(_) => "failed",
        };
        self.metrics.record_dispatch(label);
        result
    }
}
