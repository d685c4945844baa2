//! Notification fan-out
//!
//! Sends plain-text alerts to Slack (incoming webhook) and Telegram (bot
//! sendMessage API) when configured. Delivery is best-effort: failures are
//! logged and never propagated into the trading path.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::config::BotConfig;
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

struct TelegramTarget {
    bot_token: String,
    chat_id: String,
}

/// Fan-out notifier for executed trades and operational alerts
pub struct Notifier {
    client: reqwest::Client,
    slack_webhook_url: Option<String>,
    telegram: Option<TelegramTarget>,
}

impl Notifier {
    pub fn from_config(config: &BotConfig) -> Self {
        if config.slack_webhook_url.is_some() {
            info!("Slack alerts enabled");
        }

        let telegram = match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(bot_token), Some(chat_id)) => {
                info!("Telegram alerts enabled");
                Some(TelegramTarget {
                    bot_token: bot_token.clone(),
                    chat_id: chat_id.clone(),
                })
            }
            (Some(_), None) => {
                warn!("TELEGRAM_BOT_TOKEN set but TELEGRAM_CHAT_ID missing - Telegram alerts disabled");
                None
            }
            _ => None,
        };

        if config.slack_webhook_url.is_none() && telegram.is_none() {
            warn!("No notification channels configured - alerts will only be logged");
        }

        Self {
            client: reqwest::Client::new(),
            slack_webhook_url: config.slack_webhook_url.clone(),
            telegram,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.slack_webhook_url.is_some() || self.telegram.is_some()
    }

    /// Send `message` to every configured channel
    pub async fn notify(&self, message: &str) {
        if let Some(url) = &self.slack_webhook_url {
            let result = self
                .client
                .post(url)
                .json(&SlackMessage { text: message })
                .send()
                .await
                .and_then(|response| response.error_for_status());
            if let Err(e) = result {
                error!("Slack notification failed: {}", e);
            }
        }

        if let Some(telegram) = &self.telegram {
            let url = format!(
                "https://api.telegram.org/bot{}/sendMessage",
                telegram.bot_token
            );
            let result = self
                .client
                .post(&url)
                .json(&TelegramMessage {
                    chat_id: &telegram.chat_id,
                    text: message,
                })
                .send()
                .await
                .and_then(|response| response.error_for_status());
            if let Err(e) = result {
                error!("Telegram notification failed: {}", e);
            }
        }
    }
}
