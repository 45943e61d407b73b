// Live sessions - a sent message that is refreshed in place on a fixed
// cadence for a bounded number of ticks and then frozen.
//
// Lifecycle: Init (caller fetches) -> Sending -> Ticking x repeat ->
// Freezing -> Done. Each session runs on its own task spawned on the
// relay's tracker; ticks within a session are strictly sequential.

use crate::relay::error::TransportError;
use crate::relay::gateway::DeliveryGateway;
use crate::relay::protocol::{ChatId, MessageHandle};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::task::TaskTracker;

/// Default seconds between live edits
pub const DEFAULT_INTERVAL_SECS: u64 = 3;

/// Default number of live edits before freezing
pub const DEFAULT_REPEAT: usize = 5;

/// Process-wide live update settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSettings {
    /// When false, messages are sent once and never edited
    pub enabled: bool,
    pub interval: Duration,
    pub repeat: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            repeat: DEFAULT_REPEAT,
        }
    }
}

type Render<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// How a live value is turned into text, while live and once frozen
pub struct LiveView<T> {
    markdown: bool,
    render: Render<T>,
    freeze: Render<T>,
}

impl<T> LiveView<T> {
    pub fn new(
        markdown: bool,
        render: impl Fn(&T) -> String + Send + Sync + 'static,
        freeze: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            markdown,
            render: Box::new(render),
            freeze: Box::new(freeze),
        }
    }
}

/// Counters collected over one session, logged when it ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveReport {
    pub edits: usize,
    pub failed_edits: usize,
    pub skipped_fetches: usize,
    /// Renders that were empty or over the message limit
    pub skipped_renders: usize,
}

/// Starts live sessions on the relay's tracker
#[derive(Clone)]
pub struct LiveController {
    gateway: DeliveryGateway,
    settings: LiveSettings,
    tracker: TaskTracker,
}

impl LiveController {
    pub fn new(gateway: DeliveryGateway, settings: LiveSettings, tracker: TaskTracker) -> Self {
        Self {
            gateway,
            settings,
            tracker,
        }
    }

    pub fn settings(&self) -> LiveSettings {
        self.settings
    }

    /// Send the rendering of `initial` and, when live mode is on, keep it
    /// fresh by re-running `fetch` on every tick.
    ///
    /// Returns the handle of the sent message, or `None` when nothing was
    /// delivered (in which case no session is started).
    pub async fn present<T, E, F, Fut>(
        &self,
        chat_id: ChatId,
        initial: T,
        view: LiveView<T>,
        fetch: F,
    ) -> Option<MessageHandle>
    where
        T: Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let text = (view.render)(&initial);
        let handle = self.gateway.deliver(chat_id, &text, view.markdown).await?;

        if !self.settings.enabled {
            return Some(handle);
        }

        let session = LiveSession {
            gateway: self.gateway.clone(),
            handle,
            interval: self.settings.interval,
            repeat: self.settings.repeat,
            view,
            last: initial,
        };
        self.tracker.spawn(async move {
            let report = session.run(fetch).await;
            tracing::debug!(
                chat_id = handle.chat_id,
                message_id = handle.message_id,
                ?report,
                "Live session finished"
            );
        });

        Some(handle)
    }
}

struct LiveSession<T> {
    gateway: DeliveryGateway,
    handle: MessageHandle,
    interval: Duration,
    repeat: usize,
    view: LiveView<T>,
    /// Last successfully fetched value, also the source of the frozen view
    last: T,
}

impl<T: Send + Sync> LiveSession<T> {
    async fn run<E, F, Fut>(mut self, mut fetch: F) -> LiveReport
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut report = LiveReport::default();

        for tick in 0..self.repeat {
            tokio::time::sleep(self.interval).await;
            match fetch().await {
                Ok(value) => {
                    self.last = value;
                    let text = (self.view.render)(&self.last);
                    self.apply(&text, &mut report).await;
                }
                Err(e) => {
                    report.skipped_fetches += 1;
                    tracing::debug!(tick, error = %e, "Live fetch failed, keeping previous view");
                }
            }
        }

        tokio::time::sleep(self.interval).await;
        let text = (self.view.freeze)(&self.last);
        self.apply(&text, &mut report).await;

        report
    }

    async fn apply(&self, text: &str, report: &mut LiveReport) {
        if text.is_empty() || text.chars().count() > self.gateway.limit() {
            report.skipped_renders += 1;
            return;
        }

        match self
            .gateway
            .edit(self.handle, text, self.view.markdown)
            .await
        {
            Ok(()) => report.edits += 1,
            Err(TransportError::NotModified) => report.edits += 1,
            Err(e) => {
                report.failed_edits += 1;
                tracing::warn!(
                    chat_id = self.handle.chat_id,
                    message_id = self.handle.message_id,
                    error = %e,
                    "Failed to edit live message"
                );
            }
        }
    }
}
