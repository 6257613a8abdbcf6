//! Telegram Bot API client
//!
//! Only the handful of methods the bot needs: `getUpdates` (long poll),
//! `sendMessage`, `answerCallbackQuery`. Messages are sent as plain text.

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::{Inbound, Keyboard, Outbound};
use std::time::Duration;
use tracing::debug;

use super::{TransportError, TransportResult};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub data: Option<String>,
}

impl Update {
    /// The engine's view of this update; `None` for content the bot ignores
    /// (stickers, photos, edited messages, ...)
    pub fn to_inbound(&self) -> Option<Inbound> {
        if let Some(query) = &self.callback_query {
            return query.data.as_ref().map(|token| Inbound::Button {
                user_id: query.from.id,
                token: token.clone(),
            });
        }

        let message = self.message.as_ref()?;
        let user_id = message.from.as_ref().map_or(message.chat.id, |u| u.id);
        if let Some(location) = &message.location {
            return Some(Inbound::Location {
                user_id,
                lat: location.latitude,
                lon: location.longitude,
            });
        }
        message.text.as_ref().map(|text| Inbound::Text {
            user_id,
            text: text.clone(),
        })
    }
}

/// `reply_markup` object for a keyboard
pub fn reply_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Menu(rows) => json!({
            "keyboard": rows
                .iter()
                .map(|row| row.iter().map(|label| json!({ "text": label })).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        }),
        Keyboard::Inline(rows) => json!({
            "inline_keyboard": rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({ "text": b.label, "callback_data": b.token }))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
        }),
        Keyboard::RequestLocation(label) => json!({
            "keyboard": [[{ "text": label, "request_location": true }]],
            "resize_keyboard": true,
            "one_time_keyboard": true,
        }),
        Keyboard::Remove => json!({ "remove_keyboard": true }),
    }
}

/// `sendMessage` body
pub fn send_message_body(message: &Outbound) -> Value {
    let mut body = json!({
        "chat_id": message.recipient,
        "text": message.text,
    });
    if let Some(keyboard) = &message.keyboard {
        body["reply_markup"] = reply_markup(keyboard);
    }
    body
}

pub struct BotApi {
    http: Client,
    base: String,
}

impl BotApi {
    /// `timeout` must exceed the long-poll timeout
    pub fn new(token: &str, timeout: Duration) -> TransportResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: format!("{API_BASE}/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> TransportResult<T> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            other => Err(TransportError::Api {
                method: method.to_string(),
                code: other.error_code.unwrap_or(status.as_u16()),
                description: other.description.unwrap_or_default(),
            }),
        }
    }

    /// Long poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> TransportResult<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    /// Offset that skips everything queued while the bot was down
    pub async fn skip_pending(&self) -> TransportResult<Option<i64>> {
        let latest: Vec<Update> = self
            .call("getUpdates", &json!({ "offset": -1, "timeout": 0 }))
            .await?;
        let offset = latest.last().map(|u| u.update_id + 1);
        debug!(?offset, "Pending updates skipped");
        Ok(offset)
    }

    pub async fn send_message(&self, message: &Outbound) -> TransportResult<()> {
        let _: Value = self.call("sendMessage", &send_message_body(message)).await?;
        Ok(())
    }

    pub async fn answer_callback(&self, query_id: &str) -> TransportResult<()> {
        let _: bool = self
            .call("answerCallbackQuery", &json!({ "callback_query_id": query_id }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Button;

    fn update(json: Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_text_message_becomes_text() {
        let update = update(json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "chat": { "id": 42, "type": "private" },
                "from": { "id": 42, "is_bot": false, "first_name": "Aziz" },
                "text": "/start"
            }
        }));
        assert_eq!(
            update.to_inbound(),
            Some(Inbound::Text {
                user_id: 42,
                text: "/start".to_string()
            })
        );
    }

    #[test]
    fn test_location_message_becomes_location() {
        let update = update(json!({
            "update_id": 11,
            "message": {
                "chat": { "id": 42 },
                "from": { "id": 42 },
                "location": { "latitude": 41.3, "longitude": 69.2 }
            }
        }));
        assert_eq!(
            update.to_inbound(),
            Some(Inbound::Location {
                user_id: 42,
                lat: 41.3,
                lon: 69.2
            })
        );
    }

    #[test]
    fn test_callback_becomes_button() {
        let update = update(json!({
            "update_id": 12,
            "callback_query": {
                "id": "abc",
                "from": { "id": 7 },
                "data": "oc:42"
            }
        }));
        assert_eq!(
            update.to_inbound(),
            Some(Inbound::Button {
                user_id: 7,
                token: "oc:42".to_string()
            })
        );
    }

    #[test]
    fn test_sticker_is_ignored() {
        let update = update(json!({
            "update_id": 13,
            "message": { "chat": { "id": 42 }, "sticker": { "file_id": "x" } }
        }));
        assert_eq!(update.to_inbound(), None);
    }

    #[test]
    fn test_send_body_with_inline_keyboard() {
        let message = Outbound::text(42, "Tanlang").with_keyboard(Keyboard::Inline(vec![vec![
            Button::new("Cement", "p:Cement"),
        ]]));
        let body = send_message_body(&message);
        assert_eq!(body["chat_id"], 42);
        assert_eq!(body["reply_markup"]["inline_keyboard"][0][0]["callback_data"], "p:Cement");
    }

    #[test]
    fn test_location_request_markup() {
        let markup = reply_markup(&Keyboard::RequestLocation("Yuborish".to_string()));
        assert_eq!(markup["keyboard"][0][0]["request_location"], true);
        assert_eq!(reply_markup(&Keyboard::Remove)["remove_keyboard"], true);
    }
}
