//! Polling helpers for async tests.
//!
//! Prefer awaiting the relay's task tracker where possible; these helpers
//! are for effects that have no completion signal, such as a file follower
//! that runs forever.

use std::time::Duration;
use tokio::time::Instant;

/// Interval between checks
pub const POLL_EVERY: Duration = Duration::from_millis(10);

/// Poll `check` until it yields a value or `timeout` elapses.
///
/// Uses tokio's clock, so it also works under `start_paused` tests.
///
/// # Panics
///
/// Panics with `desc` and the number of attempts when the timeout elapses.
///
/// ```rust,ignore
/// let lines = assert_eventually("two lines", Duration::from_secs(2), || {
///     let seen = seen.lock().unwrap();
///     (seen.len() == 2).then(|| seen.clone())
/// })
/// .await;
/// ```
pub async fn assert_eventually<T, F>(desc: &str, timeout: Duration, mut check: F) -> T
where
    F: FnMut() -> Option<T>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if let Some(value) = check() {
            return value;
        }

        if start.elapsed() >= timeout {
            panic!(
                "Timeout waiting for {}\nDuration: {:?}\nAttempts: {}",
                desc,
                start.elapsed(),
                attempts
            );
        }
        tokio::time::sleep(POLL_EVERY).await;
    }
}
