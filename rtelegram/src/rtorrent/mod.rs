// rTorrent client - the daemon seam of the relay and its XML-RPC implementation

pub mod scgi;
pub mod xmlrpc;

use crate::relay::error::DaemonError;
use crate::relay::protocol::{DownloadOptions, Rates, Record, Stats, TorrentStatus};
use async_trait::async_trait;
use scgi::Endpoint;
use std::path::Path;
use xmlrpc::Value;

/// Operations the relay performs against the torrent daemon
#[async_trait]
pub trait TorrentDaemon: Send + Sync {
    /// Every torrent, in daemon order
    async fn list_records(&self) -> Result<Vec<Record>, DaemonError>;

    /// A single torrent by info-hash
    async fn get_record(&self, hash: &str) -> Result<Record, DaemonError>;

    async fn start(&self, records: &[Record]) -> Result<(), DaemonError>;

    async fn stop(&self, records: &[Record]) -> Result<(), DaemonError>;

    /// Re-verify piece hashes
    async fn check(&self, records: &[Record]) -> Result<(), DaemonError>;

    /// Remove torrents; `with_data` also removes their files from disk
    async fn delete(&self, records: &[Record], with_data: bool) -> Result<(), DaemonError>;

    /// Add and start a torrent from a URL or magnet link
    async fn enqueue(&self, uri: &str) -> Result<(), DaemonError>;

    /// Add and start a torrent with a target directory and label
    async fn enqueue_with_options(&self, options: &DownloadOptions) -> Result<(), DaemonError>;

    async fn stats(&self) -> Result<Stats, DaemonError>;

    /// Global transfer rates; zero when the daemon cannot be reached
    async fn rates(&self) -> Rates;

    /// "client/library" version string
    fn version(&self) -> String;
}

/// Per-torrent fields requested through `d.multicall2`, in row order
const RECORD_FIELDS: [&str; 15] = [
    "d.name=",
    "d.hash=",
    "d.size_bytes=",
    "d.completed_bytes=",
    "d.down.rate=",
    "d.up.rate=",
    "d.up.total=",
    "d.ratio=",
    "d.creation_date=",
    "d.left_bytes=",
    "d.message=",
    "d.is_active=",
    "d.complete=",
    "d.hashing=",
    "cat=\"$t.multicall=d.hash=,t.url=,cat={#}\"",
];

/// XML-RPC over SCGI client for rTorrent
#[derive(Debug, Clone)]
pub struct Rtorrent {
    endpoint: Endpoint,
    version: String,
}

impl Rtorrent {
    /// Connect to `url` and fetch the daemon's version, verifying that it answers
    pub async fn connect(url: &str) -> Result<Self, DaemonError> {
        let mut client = Self {
            endpoint: Endpoint::parse(url),
            version: String::new(),
        };

        let client_version = client.call_string("system.client_version", &[]).await?;
        let library_version = client.call_string("system.library_version", &[]).await?;
        client.version = format!("{}/{}", client_version, library_version);

        tracing::info!(endpoint = %client.endpoint, version = %client.version, "Connected to rTorrent");
        Ok(client)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, DaemonError> {
        let body = xmlrpc::encode_call(method, params);
        let raw = scgi::round_trip(&self.endpoint, body.as_bytes()).await?;
        xmlrpc::decode_response(&String::from_utf8_lossy(&raw))
    }

    async fn call_string(&self, method: &str, params: &[Value]) -> Result<String, DaemonError> {
        match self.call(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(DaemonError::Protocol(format!(
                "{} returned {:?}, expected a string",
                method, other
            ))),
        }
    }

    async fn call_int(&self, method: &str, params: &[Value]) -> Result<i64, DaemonError> {
        let value = self.call(method, params).await?;
        value.as_i64().ok_or_else(|| {
            DaemonError::Protocol(format!(
                "{} returned {:?}, expected an integer",
                method, value
            ))
        })
    }

    /// Integer read against the global target, negatives clamped to zero
    async fn global_int(&self, method: &str) -> Result<u64, DaemonError> {
        let value = self.call_int(method, &[Value::from("")]).await?;
        Ok(non_negative(value))

    }

    /// Call `method` with each record's hash; every record is attempted and
    /// the first failure is returned
    async fn for_each(&self, method: &str, records: &[Record]) -> Result<(), DaemonError> {
        let mut first_error = None;
        for record in records {
            if let Err(e) = self
                .call(method, &[Value::from(record.hash.as_str())])
                .await
            {
                tracing::warn!(method, hash = %record.hash, error = %e, "rTorrent call failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl TorrentDaemon for Rtorrent {
    async fn list_records(&self) -> Result<Vec<Record>, DaemonError> {
        let mut params = vec![Value::from(""), Value::from("main")];
        params.extend(RECORD_FIELDS.iter().map(|f| Value::from(*f)));

        let value = self.call("d.multicall2", &params).await?;
        let rows = value
            .as_array()
            .ok_or_else(|| {
                DaemonError::Protocol("d.multicall2 did not return an array".to_string())
            })?;

        rows.iter()
            .map(|row| {
                row.as_array()
                    .ok_or_else(|| {
                        DaemonError::Protocol("d.multicall2 row is not an array".to_string())
                    })
                    .and_then(record_from_row)
            })
            .collect()
    }

    async fn get_record(&self, hash: &str) -> Result<Record, DaemonError> {
        self.list_records()
            .await?
            .into_iter()
            .find(|r| r.hash.eq_ignore_ascii_case(hash))
            .ok_or_else(|| DaemonError::NotFound(hash.to_string()))
    }

    async fn start(&self, records: &[Record]) -> Result<(), DaemonError> {
        self.for_each("d.start", records).await
    }

    async fn stop(&self, records: &[Record]) -> Result<(), DaemonError> {
        self.for_each("d.stop", records).await
    }

    async fn check(&self, records: &[Record]) -> Result<(), DaemonError> {
        self.for_each("d.check_hash", records).await
    }

    async fn delete(&self, records: &[Record], with_data: bool) -> Result<(), DaemonError> {
        for record in records {
            let hash = Value::from(record.hash.as_str());
            let base_path = if with_data {
                self.call_string("d.base_path", std::slice::from_ref(&hash))
                    .await?
            } else {
                String::new()
            };

            self.call("d.erase", &[hash]).await?;

            if !base_path.is_empty() {
                remove_data(Path::new(&base_path)).await?;
                tracing::info!(name = %record.name, path = %base_path, "Removed torrent data");
            }
        }
        Ok(())
    }

    async fn enqueue(&self, uri: &str) -> Result<(), DaemonError> {
        self.call("load.start", &[Value::from(""), Value::from(uri)])
            .await
            .map(|_| ())
    }

    async fn enqueue_with_options(&self, options: &DownloadOptions) -> Result<(), DaemonError> {
        let mut params = vec![Value::from(""), Value::from(options.link.as_str())];
        if let Some(directory) = &options.directory {
            params.push(Value::from(format!("d.directory.set=\"{}\"", directory)));
        }
        if let Some(label) = &options.label {
            params.push(Value::from(format!("d.custom1.set=\"{}\"", label)));
        }
        self.call("load.start", &params).await.map(|_| ())
    }

    async fn stats(&self) -> Result<Stats, DaemonError> {
        let target = [Value::from("")];
        Ok(Stats {
            throttle_up: self.global_int("throttle.global_up.max_rate").await?,
            throttle_down: self.global_int("throttle.global_down.max_rate").await?,
            port: self.call_string("network.port_range", &target).await?,
            directory: self.call_string("directory.default", &target).await?,
            total_up: self.global_int("throttle.global_up.total").await?,
            total_down: self.global_int("throttle.global_down.total").await?,
        })
    }

    async fn rates(&self) -> Rates {
        let down = self.global_int("throttle.global_down.rate").await;
        let up = self.global_int("throttle.global_up.rate").await;
        match (down, up) {
            (Ok(down), Ok(up)) => Rates { down, up },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to read transfer rates");
                Rates::default()
            }
        }
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

fn non_negative(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

async fn remove_data(path: &Path) -> Result<(), DaemonError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await?;
    } else {
        tokio::fs::remove_file(path).await?;
    }
    Ok(())
}

/// Derive the displayed status from rTorrent's flags
pub fn derive_status(
    hashing: bool,
    active: bool,
    complete: bool,
    has_message: bool,
) -> TorrentStatus {
    if hashing {
        TorrentStatus::Hashing
    } else if has_message && !active {
        TorrentStatus::Error
    } else if active && complete {
        TorrentStatus::Seeding
    } else if active {
        TorrentStatus::Leeching
    } else if complete {
        TorrentStatus::Complete
    } else {
        TorrentStatus::Stopped
    }
}

/// Hostname of the first URL in a '#'-joined tracker list
pub fn tracker_host(trackers: &str) -> String {
    trackers
        .split('#')
        .find(|t| !t.is_empty())
        .and_then(|t| url::Url::parse(t).ok())
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

fn record_from_row(row: &[Value]) -> Result<Record, DaemonError> {
    if row.len() < RECORD_FIELDS.len() {
        return Err(DaemonError::Protocol(format!(
            "expected {} fields per torrent, got {}",
            RECORD_FIELDS.len(),
            row.len()
        )));
    }

    let text = |i: usize| row[i].as_str().unwrap_or_default().to_string();
    let int = |i: usize| {
        row[i].as_i64().ok_or_else(|| {
            DaemonError::Protocol(format!(
                "field {} is not an integer: {:?}",
                RECORD_FIELDS[i], row[i]
            ))
        })
    };

    let size = non_negative(int(2)?);
    let completed = non_negative(int(3)?);
    let down_rate = non_negative(int(4)?);
    let left = non_negative(int(9)?);
    let message = text(10);

    let percent = if size == 0 {
        0.0
    } else {
        completed as f64 * 100.0 / size as f64
    };
    let eta = if down_rate > 0 { left / down_rate } else { 0 };

    Ok(Record {
        name: text(0),
        hash: text(1),
        status: derive_status(
            int(13)? != 0,
            int(11)? != 0,
            int(12)? != 0,
            !message.is_empty(),
        ),
        completed,
        down_rate,
        up_rate: non_negative(int(5)?),
        up_total: non_negative(int(6)?),
        percent: format!("{:.1}%", percent),
        ratio: int(7)? as f64 / 1000.0,
        age: int(8)?,
        eta,
        message,
        tracker: tracker_host(&text(14)),
    })
}
