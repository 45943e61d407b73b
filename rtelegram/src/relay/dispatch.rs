// Inbound message dispatch - access control, tokenizing and routing each
// command onto its own tracked task

use crate::relay::commands::Relay;
use crate::relay::config::is_master;
use crate::relay::protocol::{ChatId, InboundMessage};
use std::sync::Arc;

/// Every chat command the relay understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Head,
    Tail,
    Down,
    Seeding,
    Paused,
    Hashing,
    Active,
    Errors,
    Sort,
    Trackers,
    Add,
    Search,
    Latest,
    Info,
    Stop,
    Start,
    Check,
    Stats,
    Speed,
    Count,
    Del,
    DelData,
    Help,
    Version,
}

impl std::str::FromStr for Command {
    type Err = String;

    /// Case-insensitive, with or without a leading '/'
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        let name = lowered.strip_prefix('/').unwrap_or(&lowered);
        match name {
            "list" | "li" => Ok(Command::List),
            "head" | "he" => Ok(Command::Head),
            "tail" | "ta" => Ok(Command::Tail),
            "down" | "dl" => Ok(Command::Down),
            "seeding" | "sd" => Ok(Command::Seeding),
            "paused" | "pa" => Ok(Command::Paused),
            "hashing" | "ha" => Ok(Command::Hashing),
            "active" | "ac" => Ok(Command::Active),
            "errors" | "er" => Ok(Command::Errors),
            "sort" | "so" => Ok(Command::Sort),
            "trackers" | "tr" => Ok(Command::Trackers),
            "add" | "ad" => Ok(Command::Add),
            "search" | "se" => Ok(Command::Search),
            "latest" | "la" => Ok(Command::Latest),
            "info" | "in" => Ok(Command::Info),
            "stop" | "sp" => Ok(Command::Stop),
            "start" | "st" => Ok(Command::Start),
            "check" | "ck" => Ok(Command::Check),
            "stats" | "sa" => Ok(Command::Stats),
            "speed" | "ss" => Ok(Command::Speed),
            "count" | "co" => Ok(Command::Count),
            "del" => Ok(Command::Del),
            "deldata" => Ok(Command::DelData),
            "help" => Ok(Command::Help),
            "version" => Ok(Command::Version),
            _ => Err(format!("Unknown command: {}", s)),
        }
    }
}

/// Split message text into a lowercased command word and its arguments.
/// Runs of spaces do not produce empty arguments.
pub fn tokenize(text: &str) -> (String, Vec<String>) {
    let mut tokens = text.split(' ').filter(|t| !t.is_empty());
    let command = tokens.next().unwrap_or_default().to_lowercase();
    (command, tokens.map(str::to_string).collect())
}

impl Relay {
    /// Route one inbound message. Commands run on their own tracked task;
    /// this returns as soon as the task is spawned.
    pub fn handle(self: &Arc<Self>, message: InboundMessage) {
        if !is_master(self.masters(), message.sender.as_deref()) {
            tracing::info!(
                sender = message.sender.as_deref().unwrap_or("<unknown>"),
                chat_id = message.chat_id,
                "Ignored a message from a non-master"
            );
            return;
        }

        let chat_id = message.chat_id;
        self.set_active_chat(chat_id);

        let (word, args) = tokenize(&message.text);
        let relay = Arc::clone(self);

        if word.is_empty() {
            let Some(document) = message.document else {
                return;
            };
            let caption = message.caption.unwrap_or_default();
            self.tasks().spawn(async move {
                relay
                    .receive_torrent(chat_id, &document.file_id, &document.file_name, &caption)
                    .await;
            });
            return;
        }

        match word.parse::<Command>() {
            Ok(command) => {
                tracing::debug!(?command, chat_id, "Dispatching command");
                self.tasks().spawn(async move {
                    relay.run(chat_id, command, &args).await;
                });
            }
            Err(_) => {
                tracing::debug!(word = %word, chat_id, "Unknown command");
                self.tasks().spawn(async move {
                    relay
                        .reply(chat_id, "no such command, try /help", false)
                        .await;
                });
            }
        }
    }

    /// Execute one parsed command to completion
    pub async fn run(&self, chat_id: ChatId, command: Command, args: &[String]) {
        match command {
            Command::List => self.list(chat_id, args).await,
            Command::Head => self.head(chat_id, args).await,
            Command::Tail => self.tail(chat_id, args).await,
            Command::Down => self.down(chat_id).await,
            Command::Seeding => self.seeding(chat_id).await,
            Command::Paused => self.paused(chat_id).await,
            Command::Hashing => self.hashing(chat_id).await,
            Command::Active => self.active(chat_id).await,
            Command::Errors => self.errors(chat_id).await,
            Command::Sort => self.sort(chat_id, args).await,
            Command::Trackers => self.trackers(chat_id).await,
            Command::Add => self.add(chat_id, args).await,
            Command::Search => self.search(chat_id, args).await,
            Command::Latest => self.latest(chat_id, args).await,
            Command::Info => self.info(chat_id, args).await,
            Command::Stop => self.stop(chat_id, args).await,
            Command::Start => self.start(chat_id, args).await,
            Command::Check => self.check(chat_id, args).await,
            Command::Stats => self.stats(chat_id).await,
            Command::Speed => self.speed(chat_id).await,
            Command::Count => self.count(chat_id).await,
            Command::Del => self.del(chat_id, args).await,
            Command::DelData => self.deldata(chat_id, args).await,
            Command::Help => self.help(chat_id).await,
            Command::Version => self.version(chat_id).await,
        }
    }
}
