//! Fire-and-forget webhook delivery of lifecycle events.
//!
//! [`WebhookDelivery`] subscribes to the [`NotifyBus`](crate::NotifyBus)
//! and POSTs each event to a configured sink URL. Failures are logged and
//! dropped; with no URL configured the task only logs each event.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::bus::LifecycleEvent;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

/// Forwards lifecycle events to an external notification sink.
pub struct WebhookDelivery {
    client: reqwest::Client,
    sink_url: Option<String>,
}

impl WebhookDelivery {
    pub fn new(sink_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, sink_url }
    }

    /// Run the delivery loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<LifecycleEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.deliver(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Webhook delivery lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Notify bus closed, webhook delivery shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event. Never propagates an error: the originating state
    /// transition has already committed.
    async fn deliver(&self, event: &LifecycleEvent) {
        let Some(url) = self.sink_url.as_deref() else {
            tracing::debug!(kind = %event.kind, event_id = event.event_id, "No notification sink configured");
            return;
        };

        if let Err(e) = self.try_send(url, event).await {
            tracing::warn!(
                kind = %event.kind,
                event_id = event.event_id,
                error = %e,
                "Notification delivery failed"
            );
        }
    }

    async fn try_send(&self, url: &str, event: &LifecycleEvent) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(event).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
