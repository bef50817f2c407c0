use crate::error::{ConfigError, DeliveryError};
use crate::notify::{truncate, AlertMessage, NotificationChannel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// The Bot API rejects messages over 4096 characters after entity parsing.
pub const MAX_MESSAGE_CHARS: usize = 4096;
const MAX_TITLE_CHARS: usize = 256;
const MAX_BODY_CHARS: usize = 3500;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Pushes alerts to one Telegram chat through the Bot API.
pub struct TelegramChannel {
    client: Client,
    bot_token: String,
    chat_id: i64,
    api_base: String,
}

impl TelegramChannel {
    pub fn new(bot_token: String, chat_id: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            bot_token,
            chat_id,
            api_base: TELEGRAM_API_BASE.to_string(),
        })
    }

    /// Point the channel at another Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

#[async_trait::async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, message: &AlertMessage) -> Result<(), DeliveryError> {
        let text = format_message(message);
        let request = SendMessageRequest {
            chat_id: self.chat_id,
            text: &text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?;

        check_response(response).await
    }

    /// Check the bot token with `getMe`.
    async fn verify(&self) -> Result<(), DeliveryError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        check_response(response).await
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

async fn check_response(response: reqwest::Response) -> Result<(), DeliveryError> {
    let status = response.status();
    let body = response.text().await?;

    // The Bot API explains failures in `description`, whatever the status.
    match serde_json::from_str::<BotApiResponse>(&body) {
        Ok(api) if api.ok && status.is_success() => Ok(()),
        Ok(api) if !api.ok => Err(DeliveryError::Rejected(
            api.description.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        )),
        _ => Err(DeliveryError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

/// HTML rendering. Service messages skip the network block.
///
/// Title and body are cut before escaping so the text stays under
/// [`MAX_MESSAGE_CHARS`] once Telegram has parsed the entities.
pub fn format_message(message: &AlertMessage) -> String {
    let title = escape_html(&truncate(&message.title, MAX_TITLE_CHARS));
    let body = escape_html(&truncate(&message.body, MAX_BODY_CHARS));

    if message.is_service_level() {
        return format!("🚀 <b>{}</b>\n\n{}", title, body);
    }

    let mut text = format!(
        "🚨 <b>{}</b>\n\n<b>Network:</b> {}\n<b>Chain ID:</b> {}\n<b>Proposal ID:</b> {}\n\n{}",
        title,
        escape_html(&message.network),
        escape_html(&message.chain_id),
        message.proposal_id.unwrap_or_default(),
        body
    );
    if let Some(link) = &message.explorer_link {
        text.push_str(&format!("\n\n<a href=\"{}\">View on explorer</a>", escape_html(link)));
    }
    text
}

/// Telegram accepts only a handful of entities; everything else must be escaped.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
