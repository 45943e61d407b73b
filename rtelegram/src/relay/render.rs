// Record rendering - turns records and aggregates into chat text.
//
// Functions named `*_frozen` produce the final view of a live session: the
// volatile fields are replaced with "-" while identity fields stay.

use crate::relay::protocol::{Rates, Record, Stats, TorrentStatus};
use chrono::DateTime;

const BYTE_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Frozen rendering of the global speed line
pub const SPEED_FROZEN: &str = "↓ - B  ↑ - B";

/// Make a user-controlled name safe to embed in markdown bold markers
pub fn escape_markdown(name: &str) -> String {
    name.replace('*', "•")
}

/// Human readable IEC byte count: "512 B", "2.0 KiB", "15 MiB"
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{:.1} {}", rounded, BYTE_UNITS[unit])
    } else {
        format!("{:.0} {}", rounded, BYTE_UNITS[unit])
    }
}

/// Added-at timestamp in the "Jan  2 15:04:05" form (UTC)
pub fn format_added(age: i64) -> String {
    match DateTime::from_timestamp(age, 0) {
        Some(at) => at.format("%b %e %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

/// Full two-line rendering used by active, head and tail
pub fn full_line(id: usize, record: &Record) -> String {
    format!(
        "`<{}>` *{}*\n{} *{}* ({}) ↓ *{}*  ↑ *{}* R: *{:.2}*\n\n",
        id,
        escape_markdown(&record.name),
        record.status,
        format_bytes(record.completed),
        record.percent,
        format_bytes(record.down_rate),
        format_bytes(record.up_rate),
        record.ratio,
    )
}

pub fn full_line_frozen(id: usize, record: &Record) -> String {
    format!(
        "`<{}>` *{}*\n{} *{}* ({}) ↓ *-*  ↑ *-* R: *{:.2}*\n\n",
        id,
        escape_markdown(&record.name),
        record.status,
        format_bytes(record.completed),
        record.percent,
        record.ratio,
    )
}

/// One-line `<id> name` entry; sent without markdown
pub fn brief_line(id: usize, record: &Record) -> String {
    format!("<{}> {}\n", id, record.name)
}

pub fn paused_line(id: usize, record: &Record) -> String {
    format!(
        "<{}> {}\n{} ({}) DL: {} UL: {}  R: {:.2}\n\n",
        id,
        record.name,
        record.status,
        record.percent,
        format_bytes(record.completed),
        format_bytes(record.up_total),
        record.ratio,
    )
}

pub fn hashing_line(id: usize, record: &Record) -> String {
    format!(
        "<{}> {}\n{} ({})\n\n",
        id, record.name, record.status, record.percent
    )
}

pub fn error_line(id: usize, record: &Record) -> String {
    format!("<{}> {}\n{}\n\n", id, record.name, record.message)
}

/// Detail view for the info command
pub fn detail(record: &Record) -> String {
    format!(
        "*{}*\n{} *{}* (*{}*) ↓ *{}*  ↑ *{}* R: *{:.2}* UP: *{}*\nAdded: *{}*, ETA: *{}*\nTracker: `{}`",
        escape_markdown(&record.name),
        record.status,
        format_bytes(record.completed),
        record.percent,
        format_bytes(record.down_rate),
        format_bytes(record.up_rate),
        record.ratio,
        format_bytes(record.up_total),
        format_added(record.age),
        record.eta,
        record.tracker,
    )
}

pub fn detail_frozen(record: &Record) -> String {
    format!(
        "*{}*\n{} *-* (*-%*) ↓ *-*  ↑ *-* R: *-* UP: *-*\nAdded: *{}*, ETA: *-*\nTracker: `{}`",
        escape_markdown(&record.name),
        record.status,
        format_added(record.age),
        record.tracker,
    )
}

/// Global speed line; sent without markdown
pub fn speed(rates: Rates) -> String {
    format!(
        "↓ {}  ↑ {}",
        format_bytes(rates.down),
        format_bytes(rates.up)
    )
}

pub fn stats(stats: &Stats) -> String {
    let throttle = |limit: u64| {
        if limit == 0 {
            "off".to_string()
        } else {
            format_bytes(limit)
        }
    };
    format!(
        "\\[Throttle  *{}* / *{}*]\n\\[Port *{}*]\n\\[*{}*]\nTotal Uploaded: *{}*\nTotal Download: *{}*",
        throttle(stats.throttle_up),
        throttle(stats.throttle_down),
        stats.port,
        stats.directory,
        format_bytes(stats.total_up),
        format_bytes(stats.total_down),
    )
}

/// Records per status plus the total
pub fn count(records: &[Record]) -> String {
    let tally = |status: TorrentStatus| records.iter().filter(|r| r.status == status).count();
    format!(
        "Leeching: *{}*\nSeeding: *{}*\nComplete: *{}*\nStopped: *{}*\nHashing: *{}*\nError: *{}*\n\nTotal: *{}*",
        tally(TorrentStatus::Leeching),
        tally(TorrentStatus::Seeding),
        tally(TorrentStatus::Complete),
        tally(TorrentStatus::Stopped),
        tally(TorrentStatus::Hashing),
        tally(TorrentStatus::Error),
        records.len(),
    )
}
