use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::{Messenger, PhotoMessage};
use crate::config::BotConfig;

/// Telegram Bot API `sendPhoto` sender. One attempt per message.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(client: Client, token: impl Into<String>, chat: impl Into<String>) -> Self {
        Self {
            client,
            api_base: "https://api.telegram.org".to_string(),
            token: token.into(),
            chat: chat.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(client: Client, bot: &BotConfig) -> Self {
        Self::new(client, bot.token.clone(), bot.chat.clone())
            .with_api_base(&bot.api_base)
            .with_timeout(bot.timeout_secs)
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendPhoto", self.api_base, self.token)
    }
}

/// JSON body for `sendPhoto` with all actions on one keyboard row.
pub fn send_photo_payload(chat: &str, msg: &PhotoMessage) -> Value {
    let row: Vec<Value> = msg
        .actions
        .iter()
        .map(|a| json!({ "text": a.label, "url": a.url }))
        .collect();
    json!({
        "chat_id": chat,
        "photo": msg.photo,
        "caption": msg.caption,
        "reply_markup": { "inline_keyboard": [row] }
    })
}

#[async_trait::async_trait]
impl Messenger for TelegramNotifier {
    async fn send(&self, msg: &PhotoMessage) -> Result<()> {
        let body = send_photo_payload(&self.chat, msg);

        let rsp = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("telegram sendPhoto")?;

        let status = rsp.status();
        if !status.is_success() {
            let text = rsp.text().await.unwrap_or_default();
            return Err(anyhow!("Telegram API error {status}: {text}"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Action;

    #[test]
    fn payload_has_one_keyboard_row_with_both_links() {
        let msg = PhotoMessage {
            photo: "https://p".into(),
            caption: "Tags: sky".into(),
            actions: vec![
                Action { label: "🌏".into(), url: "https://o".into() },
                Action { label: "⤵".into(), url: "https://f".into() },
            ],
        };
        let v = send_photo_payload("@pics", &msg);
        assert_eq!(v["chat_id"], "@pics");
        assert_eq!(v["photo"], "https://p");
        assert_eq!(v["caption"], "Tags: sky");
        let kb = &v["reply_markup"]["inline_keyboard"];
        assert_eq!(kb.as_array().unwrap().len(), 1);
        assert_eq!(kb[0][0]["url"], "https://o");
        assert_eq!(kb[0][1]["text"], "⤵");
        assert_eq!(kb[0][1]["url"], "https://f");
    }

    #[test]
    fn from_config_applies_api_base_and_send_timeout() {
        let bot = BotConfig {
            token: "9:z".into(),
            chat: "@pics".into(),
            dispatch_interval_secs: 30,
            api_base: "http://local".into(),
            timeout_secs: 3,
        };
        let n = TelegramNotifier::from_config(Client::new(), &bot);
        assert_eq!(n.timeout, Duration::from_secs(3));
        assert_eq!(n.endpoint(), "http://local/bot9:z/sendPhoto");
    }

    #[test]
    fn endpoint_embeds_token() {
        let n = TelegramNotifier::new(Client::new(), "123:abc", "c").with_api_base("http://local/");
        assert_eq!(n.endpoint(), "http://local/bot123:abc/sendPhoto");
    }
}
