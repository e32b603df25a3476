//! Critical error alerting layer for tracing.
//!
//! This layer intercepts ERROR-level events (for example a post whose content
//! was written but whose metadata insert failed) and dispatches alerts to a
//! console or webhook channel.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// Alert message containing error details.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub level: String,
    pub message: String,
    pub target: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    /// The message followed by its structured fields, `key=value` separated.
    pub fn summary(&self) -> String {
        let mut out = self.message.clone();
        for (key, value) in &self.fields {
            out.push_str(&format!(" {}={}", key, value));
        }
        out
    }
}

/// Configuration for the alert layer.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Minimum level to trigger alerts (default: ERROR).
    pub min_level: tracing::Level,
    /// Channel buffer size. Alerts beyond it are dropped.
    pub buffer_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_level: tracing::Level::ERROR,
            buffer_size: 100,
        }
    }
}

/// Trait for alert senders - implement this for different backends.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Console alert sender - writes alerts to stderr (for development).
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!(
            "\n[ALERT] {} {}\n  {}\n  at {}\n",
            alert.level,
            alert.target,
            alert.summary(),
            alert.timestamp
        );
        Ok(())
    }
}

/// Webhook alert sender - posts alerts to a webhook URL (Slack, Discord, etc.).
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": format!(
                "*Divulge {}*\n*Target:* {}\n*Message:* {}\n*Time:* {}",
                alert.level, alert.target, alert.summary(), alert.timestamp
            )
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer that forwards severe events to an [`AlertSender`].
pub struct AlertLayer {
    sender: mpsc::Sender<AlertMessage>,
    min_level: tracing::Level,
}

impl AlertLayer {
    /// Create a new alert layer with the given sender.
    ///
    /// Spawns the dispatch task, so a Tokio runtime must be running.
    pub fn new(alert_sender: Arc<dyn AlertSender>, config: AlertConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size.max(1));

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(e) = alert_sender.send(alert).await {
                    // Not a tracing event: it would loop back into this layer.
                    eprintln!("Failed to send alert: {}", e);
                }
            }
        });

        Self {
            sender: tx,
            min_level: config.min_level,
        }
    }

    /// Create an alert layer that logs to the console.
    pub fn console(config: AlertConfig) -> Self {
        Self::new(Arc::new(ConsoleAlertSender), config)
    }

    /// Create an alert layer that sends to a webhook.
    pub fn webhook(url: String, config: AlertConfig) -> Self {
        Self::new(Arc::new(WebhookAlertSender::new(url)), config)
    }
}

/// Visitor to extract fields from events.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // More verbose levels compare greater.
        if *event.metadata().level() > self.min_level {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            level: event.metadata().level().to_string(),
            message: visitor.message,
            target: event.metadata().target().to_string(),
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        // Non-blocking send
        let _ = self.sender.try_send(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_subscriber::layer::SubscriberExt;

    struct ChannelSender(mpsc::UnboundedSender<AlertMessage>);

    #[async_trait::async_trait]
    impl AlertSender for ChannelSender {
        async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
            self.0
                .send(alert)
                .map_err(|e| AlertError::SendError(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_only_errors_are_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let layer = AlertLayer::new(Arc::new(ChannelSender(tx)), AlertConfig::default());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("just a warning");
            tracing::error!(orphaned_content = "abc.md", "metadata insert failed");
        });

        let alert = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alert.level, "ERROR");
        assert_eq!(alert.message, "metadata insert failed");
        assert_eq!(
            alert.fields,
            vec![("orphaned_content".to_string(), "abc.md".to_string())]
        );
        assert!(alert.summary().contains("orphaned_content=abc.md"));
        assert!(rx.try_recv().is_err());
    }
}
