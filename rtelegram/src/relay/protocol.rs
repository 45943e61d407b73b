// Relay protocol - shared value types between the daemon client, the chat
// client and the command handlers

/// Chat identifier as assigned by the chat transport
pub type ChatId = i64;

/// Message identifier, unique within one chat
pub type MessageId = i64;

/// Torrent status as derived from the daemon's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TorrentStatus {
    /// Piece hashes are being verified
    Hashing,
    /// Open, active and incomplete
    Leeching,
    /// Open, active and complete
    Seeding,
    /// Complete but not active
    Complete,
    /// Neither active nor complete
    #[default]
    Stopped,
    /// Inactive with a daemon message attached
    Error,
}

impl TorrentStatus {
    pub const ALL: [TorrentStatus; 6] = [
        TorrentStatus::Leeching,
        TorrentStatus::Seeding,
        TorrentStatus::Complete,
        TorrentStatus::Stopped,
        TorrentStatus::Hashing,
        TorrentStatus::Error,
    ];
}

impl std::fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TorrentStatus::Hashing => write!(f, "Hashing"),
            TorrentStatus::Leeching => write!(f, "Leeching"),
            TorrentStatus::Seeding => write!(f, "Seeding"),
            TorrentStatus::Complete => write!(f, "Complete"),
            TorrentStatus::Stopped => write!(f, "Stopped"),
            TorrentStatus::Error => write!(f, "Error"),
        }
    }
}

impl std::str::FromStr for TorrentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hashing" => Ok(TorrentStatus::Hashing),
            "Leeching" => Ok(TorrentStatus::Leeching),
            "Seeding" => Ok(TorrentStatus::Seeding),
            "Complete" => Ok(TorrentStatus::Complete),
            "Stopped" => Ok(TorrentStatus::Stopped),
            "Error" => Ok(TorrentStatus::Error),
            _ => Err(format!("Unknown torrent status: {}", s)),
        }
    }
}

/// Point-in-time snapshot of one torrent.
///
/// Records carry no stable ID: the number shown to users is the record's
/// position inside the most recent ordered snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub name: String,
    /// Info-hash, used to re-fetch a single record
    pub hash: String,
    pub status: TorrentStatus,
    /// Bytes downloaded so far
    pub completed: u64,
    /// Bytes per second
    pub down_rate: u64,
    /// Bytes per second
    pub up_rate: u64,
    /// Bytes uploaded over the torrent's lifetime
    pub up_total: u64,
    /// Pre-formatted progress, e.g. "42.0%"
    pub percent: String,
    pub ratio: f64,
    /// Unix timestamp of when the torrent was added
    pub age: i64,
    /// Seconds until completion, 0 when unknown or done
    pub eta: u64,
    /// Daemon message (tracker errors and the like)
    pub message: String,
    /// Hostname of the first tracker
    pub tracker: String,
}

impl Record {
    /// Whether the torrent is currently moving data in either direction
    pub fn is_active(&self) -> bool {
        self.down_rate > 0 || self.up_rate > 0
    }
}

/// Aggregate daemon statistics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    /// Global upload cap in bytes per second, 0 when unthrottled
    pub throttle_up: u64,
    /// Global download cap in bytes per second, 0 when unthrottled
    pub throttle_down: u64,
    pub port: String,
    pub directory: String,
    pub total_up: u64,
    pub total_down: u64,
}

/// Global transfer rates in bytes per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rates {
    pub down: u64,
    pub up: u64,
}

/// The message a live session keeps editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// A torrent to enqueue with optional placement settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadOptions {
    /// URL, magnet or file link
    pub link: String,
    /// Display name used in replies
    pub name: String,
    pub directory: Option<String>,
    pub label: Option<String>,
}

/// File attached to an inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: String,
}

/// Transport-independent view of one inbound chat message
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    /// Sender username without the leading '@'
    pub sender: Option<String>,
    pub text: String,
    pub caption: Option<String>,
    pub document: Option<Attachment>,
}
