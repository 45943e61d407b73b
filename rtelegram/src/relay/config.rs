// Relay configuration - resolved settings shared by the binary and tests
// The binary fills this from command-line flags and environment variables.

use crate::relay::chunker::DEFAULT_MESSAGE_LIMIT;
use crate::relay::live::LiveSettings;
use std::path::PathBuf;

/// Default rTorrent SCGI address
pub const DEFAULT_DAEMON_URL: &str = "localhost:5000";

/// Configuration for one relay process
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bot API token
    pub token: String,
    /// Normalized usernames allowed to control the bot
    pub masters: Vec<String>,
    /// SCGI address of rTorrent: host:port or a unix socket path
    pub daemon_url: String,
    /// Log destination; stderr when unset
    pub log_file: Option<PathBuf>,
    /// rTorrent's "completed" event log to follow
    pub completed_log: Option<PathBuf>,
    /// rTorrent's "added" event log to follow
    pub added_log: Option<PathBuf>,
    pub live: LiveSettings,
    /// Per-message character limit of the chat transport
    pub message_limit: usize,
}

impl RelayConfig {
    /// Configuration with default settings for the given credentials
    pub fn new(token: impl Into<String>, masters: &str) -> Self {
        Self {
            token: token.into(),
            masters: parse_masters(masters),
            daemon_url: DEFAULT_DAEMON_URL.to_string(),
            log_file: None,
            completed_log: None,
            added_log: None,
            live: LiveSettings::default(),
            message_limit: DEFAULT_MESSAGE_LIMIT,
        }
    }

    /// Whether `username` may control the bot (case-insensitive)
    pub fn is_master(&self, username: Option<&str>) -> bool {
        is_master(&self.masters, username)
    }
}

/// Split a comma-separated masters list into normalized usernames.
///
/// '@' and spaces are stripped, names are lowercased, blanks dropped.
pub fn parse_masters(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| {
            name.chars()
                .filter(|c| *c != '@' && *c != ' ')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn is_master(masters: &[String], username: Option<&str>) -> bool {
    let Some(username) = username else {
        return false;
    };
    let username = username.trim_start_matches('@').to_lowercase();
    masters.iter().any(|m| *m == username)
}
