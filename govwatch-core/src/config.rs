// TOML configuration for the Govwatch service

use crate::error::ConfigError;
use crate::proposal::NetworkDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

pub const ENV_TELEGRAM_BOT_TOKEN: &str = "GOVWATCH_TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "GOVWATCH_TELEGRAM_CHAT_ID";
pub const ENV_SLACK_WEBHOOK_URL: &str = "GOVWATCH_SLACK_WEBHOOK_URL";

/// One week. Longer intervals would outlive any voting period anyway.
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Lead times and cadence. Missing numbers deserialize as 0 and are rejected by `validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default)]
    pub hours_before_start: u32,
    #[serde(default)]
    pub hours_before_end: u32,
    #[serde(default)]
    pub check_interval_minutes: u64,
    #[serde(default)]
    pub notify_on_startup: bool,
    #[serde(default = "default_deduplicate")]
    pub deduplicate: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rest_endpoint: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

fn default_deduplicate() -> bool {
    true
}

impl Config {
    /// Read, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Secrets from the environment take priority over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TELEGRAM_BOT_TOKEN) {
            self.notifications.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup(ENV_TELEGRAM_CHAT_ID).and_then(|v| v.trim().parse().ok()) {
            self.notifications.telegram.chat_id = chat_id;
        }
        if let Some(url) = lookup(ENV_SLACK_WEBHOOK_URL) {
            self.notifications.slack.webhook_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.alerts.hours_before_start == 0 {
            return invalid("hours_before_start must be greater than 0".to_string());
        }
        if self.alerts.hours_before_end == 0 {
            return invalid("hours_before_end must be greater than 0".to_string());
        }
        if self.alerts.check_interval_minutes == 0 {
            return invalid("check_interval_minutes must be greater than 0".to_string());
        }
        if self.alerts.check_interval_minutes > MAX_CHECK_INTERVAL_MINUTES {
            return invalid(format!(
                "check_interval_minutes must be at most {}",
                MAX_CHECK_INTERVAL_MINUTES
            ));
        }

        if self.networks.is_empty() {
            return invalid("at least one network must be configured".to_string());
        }

        for (key, network) in &self.networks {
            if network.name.trim().is_empty() {
                return invalid(format!("network name is required for {}", key));
            }
            if network.rest_endpoint.trim().is_empty() {
                return invalid(format!("rest_endpoint is required for network {}", key));
            }
            if network.chain_id.trim().is_empty() {
                return invalid(format!("chain_id is required for network {}", key));
            }
        }

        let telegram = &self.notifications.telegram;
        if telegram.enabled {
            if telegram.bot_token.trim().is_empty() {
                return invalid("telegram bot_token is required when telegram is enabled".to_string());
            }
            if telegram.chat_id == 0 {
                return invalid("telegram chat_id is required when telegram is enabled".to_string());
            }
        }

        let slack = &self.notifications.slack;
        if slack.enabled && slack.webhook_url.trim().is_empty() {
            return invalid("slack webhook_url is required when slack is enabled".to_string());
        }

        Ok(())
    }

    /// Networks in config-map order, which is unspecified.
    pub fn network_descriptors(&self) -> Vec<NetworkDescriptor> {
        self.networks
            .iter()
            .map(|(key, network)| NetworkDescriptor {
                key: key.clone(),
                name: network.name.clone(),
                endpoint: network.rest_endpoint.clone(),
                chain_id: network.chain_id.clone(),
                explorer_url: network.explorer_url.clone(),
            })
            .collect()
    }
}
