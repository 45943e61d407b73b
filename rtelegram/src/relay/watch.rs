//! Log file notifications.
//!
//! rTorrent can append a line to a log file whenever a torrent is added or
//! finishes. Each configured file is followed from its current end and
//! every new line is forwarded to the active chat.

use crate::relay::commands::Relay;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::future::Future;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Periodic re-read in case a filesystem event was missed
pub const RESCAN_INTERVAL: Duration = Duration::from_secs(5);

/// Watch the directory holding `path` and signal `tx` whenever `path` is
/// created or modified. The directory is watched so a replaced file is seen.
fn watch_file(path: &Path, tx: mpsc::UnboundedSender<()>) -> Result<RecommendedWatcher> {
    let file_name = path.file_name().map(|name| name.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        let relevant = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
            && event
                .paths
                .iter()
                .any(|p| p.file_name().map(|name| name.to_os_string()) == file_name);
        if relevant {
            let _ = tx.send(());
        }
    })
    .context("Failed to create file watcher")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    Ok(watcher)
}

/// Follow `path` from its current end, calling `on_line` for every complete
/// non-empty line appended afterwards.
///
/// The reader wakes on filesystem events for the file and, failing those,
/// every `rescan`. A file that shrinks (truncated or replaced) is reopened
/// and read from the start. Returns only on I/O or watcher errors.
pub async fn follow_file<F, Fut>(path: &Path, rescan: Duration, mut on_line: F) -> Result<()>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut file = File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut position = file.seek(SeekFrom::End(0)).await?;

    let (tx, mut changes) = mpsc::unbounded_channel();
    let _watcher = watch_file(path, tx)?;

    let mut pending: Vec<u8> = Vec::new();
    let mut buf = vec![0u8; 8192];

    loop {
        let read = file
            .read(&mut buf)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if read == 0 {
            let len = tokio::fs::metadata(path)
                .await
                .with_context(|| format!("Failed to stat {}", path.display()))?
                .len();
            if len < position {
                tracing::debug!(path = %path.display(), "Log file shrank, reopening");
                file = File::open(path)
                    .await
                    .with_context(|| format!("Failed to reopen {}", path.display()))?;
                position = 0;
                pending.clear();
                continue;
            }

            tokio::select! {
                change = changes.recv() => {
                    if change.is_none() {
                        anyhow::bail!("File watcher for {} stopped", path.display());
                    }
                }
                _ = tokio::time::sleep(rescan) => {}
            }
            continue;
        }

        position += read as u64;
        pending.extend_from_slice(&buf[..read]);

        while let Some(end) = pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw).trim_end().to_string();
            if !line.is_empty() {
                on_line(line).await;
            }
        }
    }
}

/// Forward every new line of `path` to the relay's active chat as
/// "<label>: <line>"
pub fn spawn_log_watcher(relay: Arc<Relay>, path: PathBuf, label: &'static str) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(path = %path.display(), label, "Following log file");
        let result = follow_file(&path, RESCAN_INTERVAL, |line| {
            let relay = Arc::clone(&relay);
            async move {
                relay.notify_active(&format!("{}: {}", label, line)).await;
            }
        })
        .await;

        if let Err(e) = result {
            tracing::error!(path = %path.display(), error = ?e, "Log watcher stopped");
        }
    })
}
