// Telegram Bot API client
// Thin JSON-over-HTTPS wrapper; only the calls the relay uses are modelled.

use crate::relay::error::TransportError;
use crate::relay::gateway::ChatTransport;
use crate::relay::protocol::{Attachment, ChatId, InboundMessage, MessageId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Long-poll timeout passed to getUpdates
pub const POLL_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Absent for edited messages, channel posts and other update kinds
    pub message: Option<Message>,
}

impl Update {
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            sender: message.from.and_then(|u| u.username),
            text: message.text.unwrap_or_default(),
            caption: message.caption,
            document: message.document.map(|d| Attachment {
                file_name: d.file_name.unwrap_or_else(|| d.file_id.clone()),
                file_id: d.file_id,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Client against a custom API root (a local Bot API server or a test double)
    pub fn with_api_url(
        token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 30))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TransportError> {
        let url = format!("{}/bot{}/{}", self.api_url, self.token, method);
        let response: ApiResponse<T> = self.http.post(url).json(&body).send().await?.json().await?;

        if !response.ok {
            let description = response.description.unwrap_or_default();
            if description.contains("message is not modified") {
                return Err(TransportError::NotModified);
            }
            return Err(TransportError::Api {
                code: response.error_code.unwrap_or_default(),
                description,
            });
        }
        response
            .result
            .ok_or_else(|| TransportError::MissingResult(method.to_string()))
    }

    /// The bot's own account; used at startup to validate the token
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", json!({})).await
    }

    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Long-poll for the next batch of messages, advancing `offset` past
    /// every update seen
    pub async fn next_messages(
        &self,
        offset: &mut i64,
    ) -> Result<Vec<InboundMessage>, TransportError> {
        let updates = self.get_updates(*offset, POLL_TIMEOUT_SECS).await?;
        let mut messages = Vec::with_capacity(updates.len());
        for update in updates {
            *offset = (*offset).max(update.update_id + 1);
            messages.extend(update.into_inbound());
        }
        Ok(messages)
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Result<MessageId, TransportError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        let sent: SentMessage = self.call("sendMessage", body).await?;
        Ok(sent.message_id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        markdown: bool,
    ) -> Result<(), TransportError> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        // Result is the edited message, or `true` for inline messages
        let _: serde_json::Value = self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError> {
        let body = json!({ "chat_id": chat_id, "action": "typing" });
        let _: bool = self.call("sendChatAction", body).await?;

        Ok(())
    }

    async fn file_link(&self, file_id: &str) -> Result<String, TransportError> {
        let file: File = self.call("getFile", json!({ "file_id": file_id })).await?;
        let path = file
            .file_path
            .ok_or_else(|| TransportError::MissingResult("getFile file_path".to_string()))?;
        Ok(format!("{}/file/bot{}/{}", self.api_url, self.token, path))
    }
}
