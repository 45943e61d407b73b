// Command handlers - one async method per chat command
//
// Every handler replies through the delivery gateway and never returns an
// error: argument and daemon failures become user-visible replies.

use crate::relay::config::RelayConfig;
use crate::relay::error::DaemonError;
use crate::relay::gateway::{ChatTransport, DeliveryGateway};
use crate::relay::live::{LiveController, LiveView};
use crate::relay::protocol::{ChatId, DownloadOptions, Rates, Record, TorrentStatus};
use crate::relay::render;
use crate::relay::sorting::{parse_sort_args, sort_help, SortRequest, SortSettings};
use crate::relay::upload::UploadOptions;
use crate::rtorrent::TorrentDaemon;
use regex::Regex;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Version reported by the version command
pub const BOT_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Rows shown by head, tail and latest when no count is given
pub const DEFAULT_TOP_N: i64 = 5;

pub const HELP: &str = "*list* or *li*
Lists all torrents. Takes an optional query to list only torrents whose tracker matches it, in whole or in part.

*head* or *he*
Lists the first n torrents; n defaults to 5 if no argument is given.

*tail* or *ta*
Lists the last n torrents; n defaults to 5 if no argument is given.

*down* or *dl*
Lists torrents with the status Leeching.

*seeding* or *sd*
Lists torrents with the status Seeding.

*paused* or *pa*
Lists stopped torrents.

*hashing* or *ha*
Lists torrents with the status Hashing.

*active* or *ac*
Lists torrents that are actively uploading or downloading.

*errors* or *er*
Lists torrents with errors, along with the error message.

*sort* or *so*
Changes the sort order of the commands above. Call it without arguments for details.

*trackers* or *tr*
Lists all trackers along with their number of torrents.

*add* or *ad*
Takes one or more URLs or magnets and adds them. You can also send a .torrent file via Telegram to add it.

*search* or *se*
Takes a query and lists torrents with matching names.

*latest* or *la*
Lists the newest n torrents; n defaults to 5 if no argument is given.

*info* or *in*
Takes one or more torrent IDs and shows more info about them.

*stop* or *sp*
Takes one or more torrent IDs to stop, or _all_ to stop all torrents.

*start* or *st*
Takes one or more torrent IDs to start, or _all_ to start all torrents.

*check* or *ck*
Takes one or more torrent IDs to verify, or _all_ to verify all torrents.

*del*
Takes one or more torrent IDs to delete.

*deldata*
Takes one or more torrent IDs to delete along with their data.

*stats* or *sa*
Shows daemon stats.

*speed* or *ss*
Shows the upload and download speeds.

*count* or *co*
Shows the number of torrents per status.

*help*
Shows this help message.

*version*
Shows version numbers.

- Prefix commands with '/' if you want to talk to your bot in a group.";

type SnapshotFuture = Pin<Box<dyn Future<Output = Result<Vec<Record>, DaemonError>> + Send>>;

/// Shared state of a running relay
pub struct Relay {
    daemon: Arc<dyn TorrentDaemon>,
    gateway: DeliveryGateway,
    live: LiveController,
    sort: Arc<SortSettings>,
    tasks: TaskTracker,
    masters: Vec<String>,
    /// Chat of the most recent master message, 0 before any
    active_chat: AtomicI64,
}

impl Relay {
    pub fn new(
        config: &RelayConfig,
        daemon: Arc<dyn TorrentDaemon>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        let tasks = TaskTracker::new();
        let gateway = DeliveryGateway::new(transport, config.message_limit);
        let live = LiveController::new(gateway.clone(), config.live, tasks.clone());
        Self {
            daemon,
            gateway,
            live,
            sort: Arc::new(SortSettings::default()),
            tasks,
            masters: config.masters.clone(),
            active_chat: AtomicI64::new(0),
        }
    }

    pub fn sort_settings(&self) -> &SortSettings {
        &self.sort
    }

    pub fn masters(&self) -> &[String] {
        &self.masters
    }

    /// Tracker owning every command and live session task
    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Wait until every spawned command and live session has finished
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    pub fn active_chat(&self) -> Option<ChatId> {
        match self.active_chat.load(Ordering::SeqCst) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn set_active_chat(&self, chat_id: ChatId) {
        self.active_chat.store(chat_id, Ordering::SeqCst);
    }

    /// Send `text` to the active chat, if a master has spoken yet
    pub async fn notify_active(&self, text: &str) {
        match self.active_chat() {
            Some(chat_id) => {
                self.gateway.deliver(chat_id, text, false).await;
            }
            None => tracing::debug!(text, "No active chat, dropping notification"),
        }
    }

    pub(crate) async fn reply(&self, chat_id: ChatId, text: impl AsRef<str>, markdown: bool) {
        self.gateway.deliver(chat_id, text.as_ref(), markdown).await;
    }

    async fn snapshot(&self) -> Result<Vec<Record>, DaemonError> {
        Ok(self.sort.order(self.daemon.list_records().await?))
    }

    /// Ordered snapshot, or a "<command>: <error>" reply
    async fn snapshot_or_reply(&self, chat_id: ChatId, command: &str) -> Option<Vec<Record>> {
        match self.snapshot().await {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::error!(command, error = %e, "Failed to fetch torrents");
                self.reply(chat_id, format!("{}: {}", command, e), false)
                    .await;
                None
            }
        }
    }

    /// Re-fetch closure for live sessions over the ordered snapshot
    fn snapshot_fetcher(&self) -> impl FnMut() -> SnapshotFuture + Send + 'static {
        let daemon = Arc::clone(&self.daemon);
        let sort = Arc::clone(&self.sort);
        move || -> SnapshotFuture {
            let daemon = Arc::clone(&daemon);
            let sort = Arc::clone(&sort);
            Box::pin(async move {
                Ok::<_, DaemonError>(sort.order(daemon.list_records().await?))
            })
        }
    }

    /// list [tracker-regex]
    pub async fn list(&self, chat_id: ChatId, args: &[String]) {
        let Some(records) = self.snapshot_or_reply(chat_id, "list").await else {
            return;
        };

        let text: String = match args.first() {
            Some(query) => {
                let pattern = match Regex::new(&format!("(?i){}", query)) {
                    Ok(pattern) => pattern,
                    Err(e) => {
                        self.reply(chat_id, format!("list: {}", e), false).await;
                        return;
                    }
                };
                let text: String = records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| pattern.is_match(&r.tracker))
                    .map(|(i, r)| render::brief_line(i, r))
                    .collect();
                if text.is_empty() {
                    self.reply(
                        chat_id,
                        format!("list: No tracker matches: *{}*", query),
                        true,
                    )
                    .await;
                    return;
                }
                text
            }
            None => records
                .iter()
                .enumerate()
                .map(|(i, r)| render::brief_line(i, r))
                .collect(),
        };

        if text.is_empty() {
            self.reply(chat_id, "list: No torrents", false).await;
            return;
        }
        self.reply(chat_id, text, false).await;
    }

    /// head [n]: first n records, live
    pub async fn head(&self, chat_id: ChatId, args: &[String]) {
        self.top_n(chat_id, args, "head", Edge::Head).await;
    }

    /// tail [n]: last n records, live
    pub async fn tail(&self, chat_id: ChatId, args: &[String]) {
        self.top_n(chat_id, args, "tail", Edge::Tail).await;
    }

    async fn top_n(&self, chat_id: ChatId, args: &[String], command: &str, edge: Edge) {
        let Some(n) = parse_count(args) else {
            self.reply(
                chat_id,
                format!("{}: argument must be a number", command),
                false,
            )
            .await;
            return;
        };
        let Some(records) = self.snapshot_or_reply(chat_id, command).await else {
            return;
        };

        if records.is_empty() {
            self.reply(chat_id, format!("{}: No torrents", command), false)
                .await;
            return;
        }

        let view = LiveView::new(
            true,
            move |records: &Vec<Record>| edge.render(records, n, render::full_line),
            move |records: &Vec<Record>| edge.render(records, n, render::full_line_frozen),
        );
        self.live
            .present(chat_id, records, view, self.snapshot_fetcher())
            .await;
    }

    /// down: Leeching records
    pub async fn down(&self, chat_id: ChatId) {
        self.by_status(
            chat_id,
            "down",
            TorrentStatus::Leeching,
            render::brief_line,
            "No downloads",
        )
        .await;
    }

    /// seeding: Seeding records
    pub async fn seeding(&self, chat_id: ChatId) {
        self.by_status(
            chat_id,
            "seeding",
            TorrentStatus::Seeding,
            render::brief_line,
            "No torrents seeding",
        )
        .await;
    }

    /// paused: Stopped records with their transfer totals
    pub async fn paused(&self, chat_id: ChatId) {
        self.by_status(
            chat_id,
            "paused",
            TorrentStatus::Stopped,
            render::paused_line,
            "No paused torrents",
        )
        .await;
    }

    /// hashing: records being verified
    pub async fn hashing(&self, chat_id: ChatId) {
        self.by_status(
            chat_id,
            "hashing",
            TorrentStatus::Hashing,
            render::hashing_line,
            "No torrents hashing",
        )
        .await;
    }

    /// errors: records with a daemon message
    pub async fn errors(&self, chat_id: ChatId) {
        self.by_status(
            chat_id,
            "errors",
            TorrentStatus::Error,
            render::error_line,
            "No errors",
        )
        .await;
    }

    async fn by_status(
        &self,
        chat_id: ChatId,
        command: &str,
        status: TorrentStatus,
        line: fn(usize, &Record) -> String,
        empty: &str,
    ) {
        let Some(records) = self.snapshot_or_reply(chat_id, command).await else {
            return;
        };
        let text: String = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status == status)
            .map(|(i, r)| line(i, r))
            .collect();

        if text.is_empty() {
            self.reply(chat_id, empty, false).await;
            return;
        }
        self.reply(chat_id, text, false).await;
    }

    /// active: records moving data in either direction, live
    pub async fn active(&self, chat_id: ChatId) {
        let Some(records) = self.snapshot_or_reply(chat_id, "active").await else {
            return;
        };
        if !records.iter().any(Record::is_active) {
            self.reply(chat_id, "No active torrents", false).await;
            return;
        }

        let view = LiveView::new(
            true,
            |records: &Vec<Record>| render_active(records, render::full_line),
            |records: &Vec<Record>| {
                let text = render_active(records, render::full_line_frozen);
                if text.is_empty() {
                    "No active torrents".to_string()
                } else {
                    text
                }
            },
        );
        self.live
            .present(chat_id, records, view, self.snapshot_fetcher())
            .await;
    }

    /// sort [rev] <key>
    pub async fn sort(&self, chat_id: ChatId, args: &[String]) {
        match parse_sort_args(args) {
            SortRequest::Help => self.reply(chat_id, sort_help(), true).await,
            SortRequest::Set(config) => {
                self.sort.set(config);
                tracing::info!(sort = %config, "Sort order changed");
                self.reply(chat_id, format!("sort: by `{}`", config), true)
                    .await;
            }
            SortRequest::Unknown(key) => {
                tracing::debug!(key = %key, "Unknown sort key");
                self.reply(chat_id, "unknown sorting method", false).await;
            }
        }
    }

    /// trackers: hostnames with record counts, busiest first
    pub async fn trackers(&self, chat_id: ChatId) {
        let Some(records) = self.snapshot_or_reply(chat_id, "trackers").await else {
            return;
        };

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *counts.entry(record.tracker.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let text: String = counts
            .iter()
            .map(|(host, n)| format!("{} - {}\n", n, host))
            .collect();
        if text.is_empty() {
            self.reply(chat_id, "No trackers!", false).await;
            return;
        }
        self.reply(chat_id, text, false).await;
    }

    /// add <url>...
    pub async fn add(&self, chat_id: ChatId, args: &[String]) {
        if args.is_empty() {
            self.reply(chat_id, "add: needs at least one URL", false)
                .await;
            return;
        }

        for url in args {
            if let Err(e) = self.daemon.enqueue(url).await {
                tracing::error!(url = %url, error = %e, "Failed to add torrent");
                self.reply(chat_id, format!("add: {}", e), false).await;
                continue;
            }
            let name = url.rsplit('/').next().unwrap_or(url);
            tracing::info!(url = %url, "Added torrent");
            self.reply(chat_id, format!("Added: {}", name), false).await;
        }
    }

    /// search <regex>: case-insensitive match over names
    pub async fn search(&self, chat_id: ChatId, args: &[String]) {
        if args.is_empty() {
            self.reply(chat_id, "search: needs an argument", false)
                .await;
            return;
        }

        let query = args.join(" ");
        let pattern = match Regex::new(&format!("(?i){}", query)) {
            Ok(pattern) => pattern,
            Err(e) => {
                self.reply(chat_id, format!("search: {}", e), false).await;
                return;
            }
        };
        let Some(records) = self.snapshot_or_reply(chat_id, "search").await else {
            return;
        };

        let text: String = records
            .iter()
            .enumerate()
            .filter(|(_, r)| pattern.is_match(&r.name))
            .map(|(i, r)| render::brief_line(i, r))
            .collect();
        if text.is_empty() {
            self.reply(chat_id, "No matches!", false).await;
            return;
        }
        self.reply(chat_id, text, false).await;
    }

    /// latest [n]: newest records first, with their IDs in the current order
    pub async fn latest(&self, chat_id: ChatId, args: &[String]) {
        let Some(n) = parse_count(args) else {
            self.reply(chat_id, "latest: argument must be a number", false)
                .await;
            return;
        };
        let Some(records) = self.snapshot_or_reply(chat_id, "latest").await else {
            return;
        };

        let mut newest: Vec<(usize, &Record)> = records.iter().enumerate().collect();
        newest.sort_by(|a, b| b.1.age.cmp(&a.1.age));
        let take = window_len(n, newest.len());

        let text: String = newest[..take]
            .iter()
            .map(|(i, r)| render::brief_line(*i, r))
            .collect();
        if text.is_empty() {
            self.reply(chat_id, "latest: No torrents", false).await;
            return;
        }
        self.reply(chat_id, text, false).await;
    }

    /// info <id>...: detail of each record, each live
    pub async fn info(&self, chat_id: ChatId, args: &[String]) {
        if args.is_empty() {
            self.reply(chat_id, "info: needs a torrent ID number", false)
                .await;
            return;
        }
        let Some(records) = self.snapshot_or_reply(chat_id, "info").await else {
            return;
        };

        for token in args {
            let Ok(id) = token.parse::<i64>() else {
                self.reply(chat_id, format!("info: {} is not a number", token), false)
                    .await;
                continue;
            };
            let Some(record) = lookup(&records, id) else {
                self.reply(
                    chat_id,
                    format!("info: No torrent with an ID of '{}'", id),
                    false,
                )
                .await;
                continue;
            };

            let daemon = Arc::clone(&self.daemon);
            let hash = record.hash.clone();
            let fetch = move || {
                let daemon = Arc::clone(&daemon);
                let hash = hash.clone();
                async move { daemon.get_record(&hash).await }
            };
            let view = LiveView::new(true, render::detail, render::detail_frozen);
            self.live
                .present(chat_id, record.clone(), view, fetch)
                .await;
        }
    }

    /// start <id>...|all
    pub async fn start(&self, chat_id: ChatId, args: &[String]) {
        self.act(chat_id, args, Action::Start).await;
    }

    /// stop <id>...|all
    pub async fn stop(&self, chat_id: ChatId, args: &[String]) {
        self.act(chat_id, args, Action::Stop).await;
    }

    /// check <id>...|all
    pub async fn check(&self, chat_id: ChatId, args: &[String]) {
        self.act(chat_id, args, Action::Check).await;
    }

    /// del <id>...
    pub async fn del(&self, chat_id: ChatId, args: &[String]) {
        self.act(chat_id, args, Action::Delete).await;
    }

    /// deldata <id>...
    pub async fn deldata(&self, chat_id: ChatId, args: &[String]) {
        self.act(chat_id, args, Action::DeleteData).await;
    }

    async fn act(&self, chat_id: ChatId, args: &[String], action: Action) {
        let command = action.command();
        if args.is_empty() {
            self.reply(
                chat_id,
                format!("{}: {}", command, action.missing_args()),
                false,
            )
            .await;
            return;
        }
        // IDs resolve against a snapshot taken right now
        let Some(records) = self.snapshot_or_reply(chat_id, command).await else {
            return;
        };

        if let Some(all) = action.all_done() {
            if args[0] == "all" {
                match action.apply(self.daemon.as_ref(), &records).await {
                    Ok(()) => self.reply(chat_id, all, false).await,
                    Err(e) => {
                        tracing::error!(command, error = %e, "Bulk action failed");
                        self.reply(
                            chat_id,
                            format!(
                                "{}: error occurred while {} some torrents",
                                command,
                                action.progressive()
                            ),
                            false,
                        )
                        .await;
                    }
                }
                return;
            }
        }

        for token in args {
            let Ok(id) = token.parse::<i64>() else {
                self.reply(
                    chat_id,
                    format!("{}: {} {}", command, token, action.bad_id()),
                    false,
                )
                .await;
                continue;
            };
            let Some(record) = lookup(&records, id) else {
                self.reply(
                    chat_id,
                    format!("{}: No torrent with an ID of '{}'", command, id),
                    false,
                )
                .await;
                continue;
            };

            match action
                .apply(self.daemon.as_ref(), std::slice::from_ref(record))
                .await
            {
                Ok(()) => {
                    tracing::info!(command, name = %record.name, "Torrent action applied");
                    self.reply(
                        chat_id,
                        format!("{}: {}", action.done(), record.name),
                        false,
                    )
                    .await;
                }
                Err(e) => {
                    tracing::error!(command, name = %record.name, error = %e, "Torrent action failed");
                    self.reply(chat_id, format!("{}: {}", command, e), false)
                        .await;
                }
            }
        }
    }

    /// stats: throttles, port, directory and totals
    pub async fn stats(&self, chat_id: ChatId) {
        match self.daemon.stats().await {
            Ok(stats) => self.reply(chat_id, render::stats(&stats), true).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch stats");
                self.reply(chat_id, format!("stats: {}", e), false).await;
            }
        }
    }

    /// speed: global transfer rates, live
    pub async fn speed(&self, chat_id: ChatId) {
        let rates = self.daemon.rates().await;
        let daemon = Arc::clone(&self.daemon);
        let fetch = move || {
            let daemon = Arc::clone(&daemon);
            async move { Ok::<_, Infallible>(daemon.rates().await) }
        };
        let view = LiveView::new(
            false,
            |rates: &Rates| render::speed(*rates),
            |_: &Rates| render::SPEED_FROZEN.to_string(),
        );
        self.live.present(chat_id, rates, view, fetch).await;
    }

    /// count: records per status
    pub async fn count(&self, chat_id: ChatId) {
        let Some(records) = self.snapshot_or_reply(chat_id, "count").await else {
            return;
        };
        self.reply(chat_id, render::count(&records), true).await;
    }

    pub async fn help(&self, chat_id: ChatId) {
        self.reply(chat_id, HELP, true).await;
    }

    pub async fn version(&self, chat_id: ChatId) {
        let text = format!(
            "rTorrent/libtorrent: *{}*\nrtelegram: *{}*",
            self.daemon.version(),
            BOT_VERSION
        );
        self.reply(chat_id, text, true).await;
    }

    /// A torrent file sent as a document; the caption carries options
    pub async fn receive_torrent(
        &self,
        chat_id: ChatId,
        file_id: &str,
        file_name: &str,
        caption: &str,
    ) {
        let link = match self.gateway.transport().file_link(file_id).await {
            Ok(link) => link,
            Err(e) => {
                tracing::error!(file_id, error = %e, "Failed to resolve uploaded file");
                self.reply(chat_id, format!("receiver: {}", e), false).await;
                return;
            }
        };

        let options = UploadOptions::parse(caption);
        if let Some(directory) = &options.directory {
            if !Path::new(directory).exists() {
                if let Err(e) = tokio::fs::create_dir_all(directory).await {
                    tracing::error!(directory = %directory, error = %e, "Failed to create directory");
                    self.reply(chat_id, format!("receiver: {}", e), false).await;
                    return;
                }
                self.reply(
                    chat_id,
                    format!("New directory created: {}", directory),
                    false,
                )
                .await;
            }
        }

        let download = DownloadOptions {
            link,
            name: file_name.to_string(),
            directory: options.directory,
            label: options.label,
        };
        if let Err(e) = self.daemon.enqueue_with_options(&download).await {
            tracing::error!(name = %download.name, error = %e, "Failed to add uploaded torrent");
            self.reply(chat_id, format!("add: {}", e), false).await;
            return;
        }
        tracing::info!(name = %download.name, "Added uploaded torrent");
        self.reply(chat_id, format!("Added: {}", download.name), false)
            .await;
    }
}

/// Which end of the snapshot a top-N listing shows
#[derive(Debug, Clone, Copy)]
enum Edge {
    Head,
    Tail,
}

impl Edge {
    /// Render up to `n` records from this edge, numbered by snapshot position
    fn render(self, records: &[Record], n: i64, line: fn(usize, &Record) -> String) -> String {
        let len = window_len(n, records.len());
        let start = match self {
            Edge::Head => 0,
            Edge::Tail => records.len() - len,
        };
        records[start..start + len]
            .iter()
            .enumerate()
            .map(|(i, r)| line(start + i, r))
            .collect()
    }
}

fn render_active(records: &[Record], line: fn(usize, &Record) -> String) -> String {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_active())
        .map(|(i, r)| line(i, r))
        .collect()
}

/// Optional leading count argument; `None` when it is not a number
fn parse_count(args: &[String]) -> Option<i64> {
    match args.first() {
        Some(arg) => arg.parse().ok(),
        None => Some(DEFAULT_TOP_N),
    }
}

/// Rows to show for a requested count; non-positive or oversized means all
fn window_len(n: i64, len: usize) -> usize {
    usize::try_from(n)
        .ok()
        .filter(|&n| n > 0 && n <= len)
        .unwrap_or(len)
}

fn lookup(records: &[Record], id: i64) -> Option<&Record> {
    usize::try_from(id).ok().and_then(|i| records.get(i))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Check,
    Delete,
    DeleteData,
}

impl Action {
    fn command(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Check => "check",
            Action::Delete => "del",
            Action::DeleteData => "deldata",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Action::Start => "Started",
            Action::Stop => "Stopped",
            Action::Check => "Checking",
            Action::Delete => "Deleted",
            Action::DeleteData => "Deleted with data",
        }
    }

    fn progressive(self) -> &'static str {
        match self {
            Action::Start => "starting",
            Action::Stop => "stopping",
            Action::Check => "verifying",
            Action::Delete | Action::DeleteData => "deleting",
        }
    }

    /// Reply for `<command> all`; deletions do not accept it
    fn all_done(self) -> Option<&'static str> {
        match self {
            Action::Start => Some("started all torrents"),
            Action::Stop => Some("stopped all torrents"),
            Action::Check => Some("hash checking all torrents"),
            Action::Delete | Action::DeleteData => None,
        }
    }

    fn missing_args(self) -> &'static str {
        match self {
            Action::Delete | Action::DeleteData => "needs an ID",
            _ => "needs an argument",
        }
    }

    fn bad_id(self) -> &'static str {
        match self {
            Action::Delete | Action::DeleteData => "is not an ID",
            _ => "is not a number",
        }
    }

    async fn apply(
        self,
        daemon: &dyn TorrentDaemon,
        records: &[Record],
    ) -> Result<(), DaemonError> {
        match self {
            Action::Start => daemon.start(records).await,
            Action::Stop => daemon.stop(records).await,
            Action::Check => daemon.check(records).await,
            Action::Delete => daemon.delete(records, false).await,
            Action::DeleteData => daemon.delete(records, true).await,
        }
    }
}
