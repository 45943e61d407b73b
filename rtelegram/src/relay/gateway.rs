// Delivery gateway - the only path from the relay to the chat transport.
// Long texts are chunked on the way out; edits are passed through as-is.

use crate::relay::chunker::chunk;
use crate::relay::error::TransportError;
use crate::relay::protocol::{ChatId, MessageHandle, MessageId};
use async_trait::async_trait;
use std::sync::Arc;

/// Chat transport operations the relay needs
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one message and return its identifier
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Result<MessageId, TransportError>;

    /// Replace the text of an existing message
    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        markdown: bool,
    ) -> Result<(), TransportError>;

    /// Show the "typing..." indicator
    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError>;

    /// Resolve an uploaded file to a downloadable URL
    async fn file_link(&self, file_id: &str) -> Result<String, TransportError>;
}

#[derive(Clone)]
pub struct DeliveryGateway {
    transport: Arc<dyn ChatTransport>,
    limit: usize,
}

impl DeliveryGateway {
    pub fn new(transport: Arc<dyn ChatTransport>, limit: usize) -> Self {
        Self {
            transport,
            limit: limit.max(1),
        }
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Send `text` as one or more messages.
    ///
    /// Returns the handle of the last chunk when that chunk was delivered.
    /// Transport failures are logged and never propagated.
    pub async fn deliver(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Option<MessageHandle> {
        let chunks = chunk(text, self.limit);
        if chunks.is_empty() {
            return None;
        }

        if let Err(e) = self.transport.send_typing(chat_id).await {
            tracing::debug!(chat_id, error = %e, "Typing indicator failed");
        }

        let mut last = None;
        for part in &chunks {
            last = match self.transport.send_message(chat_id, part, markdown).await {
                Ok(message_id) => Some(MessageHandle {
                    chat_id,
                    message_id,
                }),
                Err(e) => {
                    tracing::warn!(chat_id, error = %e, "Failed to send message");
                    None
                }
            };
        }
        last
    }

    /// Replace the text of `handle` in place. Never chunks; callers keep
    /// edits within the limit.
    pub async fn edit(
        &self,
        handle: MessageHandle,
        text: &str,
        markdown: bool,
    ) -> Result<(), TransportError> {
        debug_assert!(text.chars().count() <= self.limit);
        self.transport
            .edit_message(handle.chat_id, handle.message_id, text, markdown)
            .await
    }
}
