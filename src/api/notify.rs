use std::time::Duration;

use async_trait::async_trait;
use log::info;

use crate::error::{FlightWatchError, Result};

const TELEGRAM_API: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers alert text to the recipient. Callers treat every error as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self { client, bot_token: bot_token.into(), chat_id: chat_id.into() })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let url = format!("{TELEGRAM_API}/bot{}/sendMessage", self.bot_token);
        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", message)])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FlightWatchError::UpstreamStatus { status: status.as_u16(), body })
        }
    }
}

/// Used when no bot is configured: alerts only reach the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        info!("[notify] (not configured) -> {message}");
        Ok(())
    }
}

/// Picks Telegram when both the bot token and the chat id are present.
pub fn notifier_from(bot_token: &str, chat_id: &str) -> Result<Box<dyn Notifier>> {
    if bot_token.is_empty() || chat_id.is_empty() {
        Ok(Box::new(LogNotifier))
    } else {
        Ok(Box::new(TelegramNotifier::new(bot_token, chat_id)?))
    }
}
