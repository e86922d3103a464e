//! Fire-and-forget webhook delivery.
//!
//! Payloads are Discord-compatible `{content, embeds}` bodies. Delivery runs
//! on a detached task with the configured timeout and no retry; failures are
//! logged and counted, never surfaced to the request that triggered them.

use crate::config::WebhookConfig;
use acwarden_rules::WebhookPayload;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Webhook client.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(config: &WebhookConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// POST a payload. Any 2xx status is success.
    pub async fn send(&self, url: &str, payload: &WebhookPayload) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status(status))
        }
    }

    /// Deliver in the background. Does nothing when no target is configured.
    pub fn spawn(&self, url: Option<&str>, payload: WebhookPayload) -> Option<JoinHandle<()>> {
        let url = url?.to_string();
        let notifier = self.clone();
        Some(tokio::spawn(async move {
            match notifier.send(&url, &payload).await {
                Ok(()) => debug!("Webhook delivered"),
                Err(e) => {
                    crate::metrics::record_webhook_failure();
                    warn!(error = %e, "Webhook delivery failed");
                }
            }
        }))
    }
}
