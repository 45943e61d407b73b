// Error types for the two external seams: the torrent daemon and the chat transport

use thiserror::Error;

/// Failure talking to the torrent daemon
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("connection to rtorrent failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("rtorrent did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("malformed rtorrent response: {0}")]
    Protocol(String),

    #[error("rtorrent fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("no torrent with hash {0}")]
    NotFound(String),
}

/// Failure talking to the chat transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },

    /// The edit carried exactly the text already on screen
    #[error("message is not modified")]
    NotModified,

    #[error("telegram api returned no result for {0}")]
    MissingResult(String),
}
