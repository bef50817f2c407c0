use crate::config::NotificationConfig;
use crate::error::{ConfigError, DeliveryError};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod telegram;
pub mod webhook;

pub use telegram::TelegramChannel;
pub use webhook::WebhookChannel;

/// Network name that marks a message about the service itself rather than a proposal.
pub const SERVICE_NETWORK: &str = "Governance Alerts";
pub const SERVICE_CHAIN_ID: &str = "Service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
    pub network: String,
    pub chain_id: String,
    /// Absent for service-level messages.
    pub proposal_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_link: Option<String>,
}

impl AlertMessage {
    pub fn service(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            network: SERVICE_NETWORK.to_string(),
            chain_id: SERVICE_CHAIN_ID.to_string(),
            proposal_id: None,
            explorer_link: None,
        }
    }

    pub fn is_service_level(&self) -> bool {
        self.network == SERVICE_NETWORK
    }
}

#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), DeliveryError>;

    /// Check credentials without sending anything.
    async fn verify(&self) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Outcome of one channel for one message.
#[derive(Debug)]
pub struct ChannelResult {
    pub channel: String,
    pub outcome: Result<(), DeliveryError>,
}

impl ChannelResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&DeliveryError> {
        self.outcome.as_ref().err()
    }
}

/// First failed channel, in channel order.
pub fn first_failure(results: &[ChannelResult]) -> Option<&ChannelResult> {
    results.iter().find(|r| !r.is_success())
}

/// Whether the message reached anyone. With no channels configured there is
/// nobody to retry for, so that counts as delivered.
pub fn delivered(results: &[ChannelResult]) -> bool {
    results.is_empty() || results.iter().any(ChannelResult::is_success)
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Owns every enabled channel for the life of the process.
pub struct Notifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// A notifier that delivers nowhere, for dry runs.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self, ConfigError> {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if config.telegram.enabled {
            debug!(chat_id = config.telegram.chat_id, "Initializing Telegram channel");
            channels.push(Box::new(TelegramChannel::new(
                config.telegram.bot_token.clone(),
                config.telegram.chat_id,
            )?));
        }

        if config.slack.enabled {
            debug!("Initializing Slack webhook channel");
            channels.push(Box::new(WebhookChannel::new(
                "slack",
                config.slack.webhook_url.clone(),
            )?));
        }

        if channels.is_empty() {
            warn!("No notification channels enabled; alerts will only be logged");
        }

        Ok(Self::new(channels))
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Verify every channel's credentials concurrently.
    pub async fn verify_all(&self) -> Vec<ChannelResult> {
        let checks = self.channels.iter().map(|channel| async move {
            ChannelResult {
                channel: channel.name().to_string(),
                outcome: channel.verify().await,
            }
        });
        join_all(checks).await
    }

    /// Deliver `message` on every channel. A failing channel never stops the others.
    pub async fn send_all(&self, message: &AlertMessage) -> Vec<ChannelResult> {
        let sends = self.channels.iter().map(|channel| async move {
            ChannelResult {
                channel: channel.name().to_string(),
                outcome: channel.send(message).await,
            }
        });
        let results = join_all(sends).await;

        for result in &results {
            match &result.outcome {
                Ok(()) => info!(
                    channel = %result.channel,
                    network = %message.network,
                    proposal_id = ?message.proposal_id,
                    "Notification sent"
                ),
                Err(e) => warn!(
                    channel = %result.channel,
                    network = %message.network,
                    proposal_id = ?message.proposal_id,
                    error = %e,
                    "Notification failed"
                ),
            }
        }

        results
    }
}
