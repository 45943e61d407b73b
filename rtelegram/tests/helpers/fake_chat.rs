// Recording chat transport
//
// Every successful transport call is appended to a log; sends get
// increasing message ids starting at 1.

use async_trait::async_trait;
use rtelegram_lib::relay::error::TransportError;
use rtelegram_lib::relay::gateway::ChatTransport;
use rtelegram_lib::relay::protocol::{ChatId, MessageId};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Typing { chat_id: ChatId },
    Send {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        markdown: bool,
    },
    Edit {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        markdown: bool,
    },
}

#[derive(Default)]
pub struct FakeChat {
    calls: Mutex<Vec<ChatCall>>,
    last_id: AtomicI64,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
}

impl FakeChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_sends(&self, on: bool) {
        self.fail_sends.store(on, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, on: bool) {
        self.fail_edits.store(on, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of every sent message, in order
    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// (message id, text) of every edit, in order
    pub fn edits(&self) -> Vec<(MessageId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Edit {
                    message_id,
                    text,
                    ..
                } => Some((message_id, text)),
                _ => None,
            })
            .collect()
    }

    /// The single sent message; panics when there is not exactly one
    pub fn only_sent(&self) -> String {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected one message, got {:?}", sent);
        sent.into_iter().next().unwrap()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected() -> TransportError {
    TransportError::Api {
        code: 400,
        description: "Bad Request: rejected by test".to_string(),
    }
}

#[async_trait]
impl ChatTransport for FakeChat {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Result<MessageId, TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        let message_id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(ChatCall::Send {
            chat_id,
            message_id,
            text: text.to_string(),
            markdown,
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        markdown: bool,
    ) -> Result<(), TransportError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        self.record(ChatCall::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
            markdown,
        });
        Ok(())
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError> {
        self.record(ChatCall::Typing { chat_id });
        Ok(())
    }

    async fn file_link(&self, file_id: &str) -> Result<String, TransportError> {
        if file_id.is_empty() {
            return Err(TransportError::MissingResult(
                "getFile file_path".to_string(),
            ));

        }
        Ok(format!("https://files.example/{}", file_id))
    }
}
