// SCGI transport for rTorrent
// One request per connection: netstring headers, body, then read until EOF.

use crate::relay::error::DaemonError;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Upper bound for one response; a listing of thousands of torrents is a few MiB
pub const MAX_RESPONSE_SIZE: u64 = 64 * 1024 * 1024;

/// How long a single round trip may take
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where rTorrent's SCGI listener lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp(String),
    Unix(PathBuf),
}

impl Endpoint {
    /// `host:port` (optionally prefixed with `scgi://`) or an absolute socket path
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let url = url.strip_prefix("scgi://").unwrap_or(url);
        if url.starts_with('/') {
            Endpoint::Unix(PathBuf::from(url))
        } else {
            Endpoint::Tcp(url.to_string())
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "{}", addr),
            Endpoint::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Frame an XML-RPC body as an SCGI request
pub fn encode_request(body: &[u8]) -> Vec<u8> {
    let mut headers = Vec::new();
    for (key, value) in [
        ("CONTENT_LENGTH", body.len().to_string()),
        ("SCGI", "1".to_string()),
        ("REQUEST_METHOD", "POST".to_string()),
    ] {
        headers.extend_from_slice(key.as_bytes());
        headers.push(0);
        headers.extend_from_slice(value.as_bytes());
        headers.push(0);
    }

    let mut request = format!("{}:", headers.len()).into_bytes();
    request.extend_from_slice(&headers);
    request.push(b',');
    request.extend_from_slice(body);
    request
}

/// Strip the CGI-style response headers and return the body
pub fn split_response(raw: &[u8]) -> Result<&[u8], DaemonError> {
    let (head, body) = if let Some(at) = find(raw, b"\r\n\r\n") {
        (&raw[..at], &raw[at + 4..])
    } else if let Some(at) = find(raw, b"\n\n") {
        (&raw[..at], &raw[at + 2..])
    } else {
        return Err(DaemonError::Protocol(
            "response without header terminator".to_string(),
        ));
    };

    let head = String::from_utf8_lossy(head);
    for line in head.lines() {
        if let Some(status) = line.strip_prefix("Status:") {
            let status = status.trim();
            if !status.starts_with("200") {
                return Err(DaemonError::Protocol(format!("scgi status {}", status)));
            }
        }
    }
    Ok(body)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Send one request body and return the response body
pub async fn round_trip(endpoint: &Endpoint, body: &[u8]) -> Result<Vec<u8>, DaemonError> {
    let request = encode_request(body);
    let exchange = async {
        match endpoint {
            Endpoint::Tcp(addr) => {
                let mut stream = TcpStream::connect(addr.as_str()).await?;
                exchange(&mut stream, &request).await
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                let mut stream = tokio::net::UnixStream::connect(path).await?;
                exchange(&mut stream, &request).await
            }
            #[cfg(not(unix))]
            Endpoint::Unix(path) => Err(DaemonError::Protocol(format!(
                "unix sockets are not supported on this platform: {}",
                path.display()
            ))),
        }
    };

    let raw = tokio::time::timeout(REQUEST_TIMEOUT, exchange)
        .await
        .map_err(|_| DaemonError::Timeout(REQUEST_TIMEOUT))??;
    split_response(&raw).map(<[u8]>::to_vec)
}

async fn exchange<S>(stream: &mut S, request: &[u8]) -> Result<Vec<u8>, DaemonError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut raw = Vec::new();
    let read = stream
        .take(MAX_RESPONSE_SIZE + 1)
        .read_to_end(&mut raw)
        .await?;
    if read as u64 > MAX_RESPONSE_SIZE {
        return Err(DaemonError::Protocol(format!(
            "response exceeds {} bytes",
            MAX_RESPONSE_SIZE
        )));
    }
    Ok(raw)
}
