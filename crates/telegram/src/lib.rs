//! Outbound Telegram alerts for entry events.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::warn;

use common::Notifier;

/// Per-message cap so a stalled Telegram API cannot hold up the scan loop.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends every alert to all configured chats. Failures are logged and
/// swallowed; a dropped notification must never abort a trade cycle.
pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_ids: &[i64]) -> Self {
        Self {
            bot: Bot::new(token),
            chat_ids: chat_ids.iter().map(|&id| ChatId(id)).collect(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) {
        for &chat_id in &self.chat_ids {
            match tokio::time::timeout(SEND_TIMEOUT, self.bot.send_message(chat_id, message).send())
                .await
            {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    warn!(chat_id = ?chat_id, error = %e, "Failed to send Telegram alert");
                }
                Err(_) => {
                    warn!(chat_id = ?chat_id, "Telegram alert timed out");
                }
            }
        }
    }
}
