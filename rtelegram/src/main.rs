// rtelegram - relay rTorrent status into a Telegram chat
// Connects to rTorrent over SCGI, long-polls the Bot API and runs every
// master command on its own task.

use anyhow::{Context, Result};
use clap::Parser;
use rtelegram_lib::relay::chunker::DEFAULT_MESSAGE_LIMIT;
use rtelegram_lib::relay::commands::Relay;
use rtelegram_lib::relay::config::{parse_masters, RelayConfig, DEFAULT_DAEMON_URL};
use rtelegram_lib::relay::live::{LiveSettings, DEFAULT_INTERVAL_SECS, DEFAULT_REPEAT};
use rtelegram_lib::relay::watch::spawn_log_watcher;
use rtelegram_lib::rtorrent::Rtorrent;
use rtelegram_lib::telegram::TelegramClient;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Pause before retrying after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// How long shutdown waits for in-flight commands
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "rtelegram", version, about = "Control rTorrent from Telegram")]
struct Cli {
    /// Telegram bot token
    #[arg(long, env = "RT_TOKEN", hide_env_values = true)]
    token: String,

    /// Comma-separated usernames allowed to control the bot
    #[arg(long, env = "RT_MASTERS")]
    masters: String,

    /// rTorrent SCGI address: host:port or a unix socket path
    #[arg(long, default_value = DEFAULT_DAEMON_URL)]
    url: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// rTorrent log of completed torrents to follow
    #[arg(long = "completed-torrents-logfile")]
    completed_torrents_logfile: Option<PathBuf>,

    /// rTorrent log of added torrents to follow
    #[arg(long = "added-torrents-logfile")]
    added_torrents_logfile: Option<PathBuf>,

    /// Send status messages once without live updates
    #[arg(long, default_value_t = false)]
    no_live: bool,

    /// Seconds between live updates
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,

    /// Number of live updates before a message is frozen
    #[arg(long, default_value_t = DEFAULT_REPEAT)]
    duration: usize,

    /// Per-message character limit
    #[arg(long, default_value_t = DEFAULT_MESSAGE_LIMIT)]
    message_limit: usize,
}

impl Cli {
    fn into_config(self) -> RelayConfig {
        RelayConfig {
            token: self.token,
            masters: parse_masters(&self.masters),
            daemon_url: self.url,
            log_file: self.logfile,
            completed_log: self.completed_torrents_logfile,
            added_log: self.added_torrents_logfile,
            live: LiveSettings {
                enabled: !self.no_live,
                interval: Duration::from_secs(self.interval),
                repeat: self.duration,
            },
            message_limit: self.message_limit,
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            fmt()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_env_filter(filter())
                .init();
        }
        None => {
            fmt().with_target(false).with_env_filter(filter()).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config();
    init_logging(config.log_file.as_deref())?;

    if config.masters.is_empty() {
        anyhow::bail!("at least one master username is required");
    }
    info!(
        masters = ?config.masters,
        url = %config.daemon_url,
        live = config.live.enabled,
        "Starting rtelegram"
    );

    let daemon = Rtorrent::connect(&config.daemon_url)
        .await
        .with_context(|| format!("Failed to connect to rTorrent at {}", config.daemon_url))?;

    let client = TelegramClient::new(config.token.clone()).context("Failed to build HTTP client")?;
    let telegram = Arc::new(client);
    let me = telegram
        .get_me()
        .await
        .context("Failed to authorize with Telegram")?;
    info!(
        username = me.username.as_deref().unwrap_or(&me.first_name),
        "Authorized on Telegram"
    );

    let relay = Arc::new(Relay::new(&config, Arc::new(daemon), telegram.clone()));

    let mut watchers = Vec::new();
    if let Some(path) = config.completed_log.clone() {
        watchers.push(spawn_log_watcher(Arc::clone(&relay), path, "Completed"));
    }
    if let Some(path) = config.added_log.clone() {
        watchers.push(spawn_log_watcher(Arc::clone(&relay), path, "Added"));
    }

    let mut offset = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            batch = telegram.next_messages(&mut offset) => match batch {
                Ok(messages) => {
                    for message in messages {
                        relay.handle(message);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch updates");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    for watcher in watchers {
        watcher.abort();
    }
    relay.tasks().close();
    if tokio::time::timeout(SHUTDOWN_GRACE, relay.tasks().wait())
        .await
        .is_err()
    {

        error!(
            remaining = relay.tasks().len(),
            "Shutting down with commands still running"
        );
    }
    Ok(())
}
