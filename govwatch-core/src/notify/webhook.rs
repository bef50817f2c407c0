use crate::error::{ConfigError, DeliveryError};
use crate::notify::{AlertMessage, NotificationChannel};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": ...}` to an incoming-webhook URL (Slack and compatibles).
pub struct WebhookChannel {
    client: Client,
    name: String,
    url: String,
}

impl WebhookChannel {
    pub fn new(name: impl Into<String>, url: String) -> Result<Self, ConfigError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            name: name.into(),
            url,
        })
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, message: &AlertMessage) -> Result<(), DeliveryError> {
        let text = format_message(message);
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: &text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Slack mrkdwn rendering.
pub fn format_message(message: &AlertMessage) -> String {
    if message.is_service_level() {
        return format!("🚀 *{}*\n\n{}", message.title, message.body);
    }

    let mut text = format!(
        "🚨 *{}*\n\n*Network:* {}\n*Chain ID:* {}\n*Proposal ID:* {}\n\n{}",
        message.title,
        message.network,
        message.chain_id,
        message.proposal_id.unwrap_or_default(),
        message.body
    );
    if let Some(link) = &message.explorer_link {
        text.push_str(&format!("\n\n<{}|View on explorer>", link));
    }
    text
}
