// Snapshot ordering - the process-wide sort configuration and the
// comparator every listing command applies before rendering

use crate::relay::protocol::Record;
use std::cmp::Ordering;
use std::sync::{PoisonError, RwLock};

/// Field a snapshot is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    DownRate,
    UpRate,
    /// Completed bytes
    Size,
    Ratio,
    Age,
    UpTotal,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Name,
        SortKey::DownRate,
        SortKey::UpRate,
        SortKey::Size,
        SortKey::Ratio,
        SortKey::Age,
        SortKey::UpTotal,
    ];

    /// Keyword accepted by the sort command
    pub fn keyword(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::DownRate => "downrate",
            SortKey::UpRate => "uprate",
            SortKey::Size => "size",
            SortKey::Ratio => "ratio",
            SortKey::Age => "age",
            SortKey::UpTotal => "upload",
        }
    }

    /// Human-readable name used in confirmations
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::DownRate => "down rate",
            SortKey::UpRate => "up rate",
            SortKey::Size => "size",
            SortKey::Ratio => "ratio",
            SortKey::Age => "age",
            SortKey::UpTotal => "up total",
        }
    }

    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::DownRate => a.down_rate.cmp(&b.down_rate),
            SortKey::UpRate => a.up_rate.cmp(&b.up_rate),
            SortKey::Size => a.completed.cmp(&b.completed),
            SortKey::Ratio => a.ratio.total_cmp(&b.ratio),
            SortKey::Age => a.age.cmp(&b.age),
            SortKey::UpTotal => a.up_total.cmp(&b.up_total),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|key| key.keyword() == wanted)
            .ok_or_else(|| format!("Unknown sort key: {}", s))
    }
}

/// Selected key plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: SortKey,
    pub reversed: bool,
}

impl SortConfig {
    pub fn new(key: SortKey, reversed: bool) -> Self {
        Self { key, reversed }
    }

    /// Comparator for this configuration. Reversing flips the comparison
    /// rather than the sorted output, so equal records keep fetch order.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = self.key.compare(a, b);
        if self.reversed {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl std::fmt::Display for SortConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.reversed {
            write!(f, "reversed {}", self.key.label())
        } else {
            f.write_str(self.key.label())
        }
    }
}

/// Stable sort of `records` under `config`
pub fn order(mut records: Vec<Record>, config: SortConfig) -> Vec<Record> {
    records.sort_by(|a, b| config.compare(a, b));
    records
}

/// Shared sort configuration: written by the sort command, read by every
/// listing command.
#[derive(Debug, Default)]
pub struct SortSettings {
    current: RwLock<SortConfig>,
}

impl SortSettings {
    pub fn new(initial: SortConfig) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> SortConfig {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, config: SortConfig) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Order a snapshot with the configuration in effect right now
    pub fn order(&self, records: Vec<Record>) -> Vec<Record> {
        order(records, self.get())
    }
}

/// What a `sort` invocation asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortRequest {
    Help,
    Set(SortConfig),
    Unknown(String),
}

/// Interpret the arguments of the sort command: `[rev] <key>`
pub fn parse_sort_args<S: AsRef<str>>(args: &[S]) -> SortRequest {
    let mut tokens = args.iter().map(|a| a.as_ref()).filter(|a| !a.is_empty());
    let Some(first) = tokens.next() else {
        return SortRequest::Help;
    };

    let (reversed, key) = if first.eq_ignore_ascii_case("rev") {
        (true, tokens.next().unwrap_or(""))
    } else {
        (false, first)
    };

    match key.parse::<SortKey>() {
        Ok(key) => SortRequest::Set(SortConfig::new(key, reversed)),
        Err(_) => SortRequest::Unknown(key.to_string()),
    }
}

/// Help text listing every sort keyword
pub fn sort_help() -> String {
    let keys: Vec<&str> = SortKey::ALL.iter().map(|k| k.keyword()).collect();
    format!(
        "sort takes one of:\n(*{}*)\noptionally start with (*rev*) for reversed order\ne.g. \"*sort rev size*\" to get biggest torrents first.",
        keys.join(", ")
    )
}
