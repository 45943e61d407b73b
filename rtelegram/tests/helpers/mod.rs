// Shared fixtures for the integration tests
#![allow(dead_code)]

pub mod fake_chat;
pub mod fake_daemon;

use fake_chat::FakeChat;
use fake_daemon::FakeDaemon;
use rtelegram_lib::relay::commands::Relay;
use rtelegram_lib::relay::config::RelayConfig;
use rtelegram_lib::relay::live::LiveSettings;
use rtelegram_lib::relay::protocol::{ChatId, InboundMessage, Record, TorrentStatus};
use std::sync::Arc;
use std::time::Duration;

pub const CHAT: ChatId = 4242;
pub const MASTER: &str = "alice";

/// A relay wired to fakes, returned with handles to both fakes
pub fn relay_with(
    records: Vec<Record>,
    live: LiveSettings,
) -> (Arc<Relay>, Arc<FakeChat>, Arc<FakeDaemon>) {

    let mut config = RelayConfig::new("test-token", MASTER);
    config.live = live;

    let chat = FakeChat::new();
    let daemon = FakeDaemon::with_records(records);
    let relay = Arc::new(Relay::new(&config, daemon.clone(), chat.clone()));
    (relay, chat, daemon)
}

pub fn live_off() -> LiveSettings {
    LiveSettings {
        enabled: false,
        ..LiveSettings::default()
    }
}

pub fn live_on(repeat: usize) -> LiveSettings {
    LiveSettings {
        enabled: true,
        interval: Duration::from_secs(3),
        repeat,
    }
}

/// A text message from the master in the test chat
pub fn from_master(text: &str) -> InboundMessage {
    InboundMessage {
        chat_id: CHAT,
        sender: Some(MASTER.to_string()),
        text: text.to_string(),
        caption: None,
        document: None,
    }
}

/// Send `text` as the master and wait for every resulting task
pub async fn say(relay: &Arc<Relay>, text: &str) {
    relay.handle(from_master(text));
    relay.wait_idle().await;
}

/// A torrent with a derived hash and sensible defaults
pub fn torrent(name: &str) -> Record {
    Record {
        name: name.to_string(),
        hash: name.to_uppercase(),
        status: TorrentStatus::Stopped,
        percent: "0.0%".to_string(),
        tracker: "tracker.example.org".to_string(),
        ..Record::default()
    }
}
