// Scriptable torrent daemon
//
// Holds an in-memory list of records. Fetches (list_records and
// get_record share one counter) can be scripted to fail by call number.

use async_trait::async_trait;
use rtelegram_lib::relay::error::DaemonError;
use rtelegram_lib::relay::protocol::{DownloadOptions, Rates, Record, Stats};
use rtelegram_lib::rtorrent::TorrentDaemon;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const VERSION: &str = "0.9.8/0.13.8";

#[derive(Default)]
pub struct FakeDaemon {
    records: Mutex<Vec<Record>>,
    fetches: AtomicUsize,
    failing_fetches: Mutex<HashSet<usize>>,
    switches: Mutex<Vec<(usize, Vec<Record>)>>,
    actions: Mutex<Vec<String>>,
    enqueued: Mutex<Vec<DownloadOptions>>,
    stats: Mutex<Stats>,
    rates: Mutex<Rates>,
}

impl FakeDaemon {
    pub fn with_records(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Self::default()
        })
    }

    pub fn set_records(&self, records: Vec<Record>) {
        *self.records.lock().unwrap() = records;
    }

    /// Make the `n`th fetch (1-based) fail
    pub fn fail_fetch(&self, n: usize) {
        self.failing_fetches.lock().unwrap().insert(n);
    }

    /// Replace the records from the `n`th fetch (1-based) onward
    pub fn switch_records_at(&self, n: usize, records: Vec<Record>) {
        self.switches.lock().unwrap().push((n, records));
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// "<action>:<name>" for every record an action touched
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn enqueued(&self) -> Vec<DownloadOptions> {
        self.enqueued.lock().unwrap().clone()
    }

    pub fn set_stats(&self, stats: Stats) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn set_rates(&self, rates: Rates) {
        *self.rates.lock().unwrap() = rates;
    }

    fn fetch(&self) -> Result<Vec<Record>, DaemonError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_fetches.lock().unwrap().contains(&n) {
            return Err(DaemonError::Protocol("scripted failure".to_string()));
        }
        let mut switches = self.switches.lock().unwrap();
        if let Some(at) = switches.iter().position(|(from, _)| *from <= n) {
            let (_, records) = switches.remove(at);
            self.set_records(records);
        }
        Ok(self.records.lock().unwrap().clone())
    }

    fn log(&self, action: &str, records: &[Record]) {
        let mut actions = self.actions.lock().unwrap();
        actions.extend(records.iter().map(|r| format!("{}:{}", action, r.name)));
    }
}

#[async_trait]
impl TorrentDaemon for FakeDaemon {
    async fn list_records(&self) -> Result<Vec<Record>, DaemonError> {
        self.fetch()
    }

    async fn get_record(&self, hash: &str) -> Result<Record, DaemonError> {
        self.fetch()?
            .into_iter()
            .find(|r| r.hash == hash)
            .ok_or_else(|| DaemonError::NotFound(hash.to_string()))
    }

    async fn start(&self, records: &[Record]) -> Result<(), DaemonError> {
        self.log("start", records);
        Ok(())
    }

    async fn stop(&self, records: &[Record]) -> Result<(), DaemonError> {
        self.log("stop", records);
        Ok(())
    }

    async fn check(&self, records: &[Record]) -> Result<(), DaemonError> {
        self.log("check", records);
        Ok(())
    }

    async fn delete(&self, records: &[Record], with_data: bool) -> Result<(), DaemonError> {
        self.log(if with_data { "deldata" } else { "del" }, records);
        Ok(())
    }

    async fn enqueue(&self, uri: &str) -> Result<(), DaemonError> {
        if uri.contains("broken") {
            return Err(DaemonError::Fault {
                code: -501,
                message: "Could not create download".to_string(),
            });
        }
        self.enqueued.lock().unwrap().push(DownloadOptions {
            link: uri.to_string(),
            ..DownloadOptions::default()
        });
        Ok(())
    }

    async fn enqueue_with_options(&self, options: &DownloadOptions) -> Result<(), DaemonError> {
        self.enqueued.lock().unwrap().push(options.clone());
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, DaemonError> {
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn rates(&self) -> Rates {
        *self.rates.lock().unwrap()
    }

    fn version(&self) -> String {
        VERSION.to_string()
    }
}
