//! Message delivery to chat destinations.

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::json;

const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// Delivers one composed message to one destination. At most one attempt per
/// call; failures are reported as `false`, never raised.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, destination_id: &str, text: &str) -> bool;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    async fn deliver(&self, destination_id: &str, text: &str) -> bool {
        (**self).deliver(destination_id, text).await
    }
}

pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            base_url: TELEGRAM_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, destination_id: &str, text: &str) -> bool {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let payload = json!({
            "chat_id": destination_id,
            "text": text,
            "parse_mode": "HTML"
        });

        let res = match self.client.post(&url).json(&payload).send().await {
            Ok(res) => res,
            Err(err) => {
                error!("Telegram request to {} failed: {}", destination_id, err);
                return false;
            }
        };

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(
                "Telegram rejected message to {} (status {}): {}",
                destination_id, status, body
            );
            return false;
        }

        // Telegram wraps the result; "ok" is authoritative even on 200.
        match res.json::<serde_json::Value>().await {
            Ok(body) => body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
            Err(err) => {
                error!("Unreadable Telegram response for {}: {}", destination_id, err);
                false
            }
        }
    }
}
