//! Live session lifecycle: initial send, ticking edits, freeze.
//!
//! Runs on tokio's paused clock so every interval elapses instantly.

mod helpers;

use helpers::fake_chat::{ChatCall, FakeChat};
use pretty_assertions::assert_eq;
use rtelegram_lib::relay::gateway::DeliveryGateway;
use rtelegram_lib::relay::live::{LiveController, LiveSettings, LiveView};
use rtelegram_lib::relay::protocol::MessageHandle;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;

const CHAT: i64 = 7;
const INTERVAL: Duration = Duration::from_secs(3);

fn controller(
    chat: &Arc<FakeChat>,
    limit: usize,
    enabled: bool,
    repeat: usize,
) -> (LiveController, TaskTracker) {
    let tracker = TaskTracker::new();
    let gateway = DeliveryGateway::new(chat.clone(), limit);
    let settings = LiveSettings {
        enabled,
        interval: INTERVAL,
        repeat,
    };
    let live = LiveController::new(gateway, settings, tracker.clone());
    (live, tracker)
}

fn counter_view() -> LiveView<u32> {
    LiveView::new(
        false,
        |n: &u32| format!("tick {}", n),
        |n: &u32| format!("frozen {}", n),
    )
}

/// Fetch closure yielding the scripted results in order
fn scripted(
    results: Vec<Result<u32, &'static str>>,
) -> impl FnMut() -> std::future::Ready<Result<u32, &'static str>> + Send + 'static {
    let script = Arc::new(Mutex::new(VecDeque::from(results)));
    move || {
        let next = script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err("script exhausted"));
        std::future::ready(next)
    }
}

async fn finish(tracker: &TaskTracker) {
    tracker.close();
    tracker.wait().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_repeat_sends_then_freezes() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 4096, true, 0);
    let started = Instant::now();

    let handle = live
        .present(CHAT, 1u32, counter_view(), scripted(vec![]))
        .await;
    finish(&tracker).await;

    let expected = MessageHandle {
        chat_id: CHAT,
        message_id: 1,
    };
    assert_eq!(handle, Some(expected));
    assert_eq!(
        chat.calls(),
        vec![
            ChatCall::Typing { chat_id: CHAT },
            ChatCall::Send {
                chat_id: CHAT,
                message_id: 1,
                text: "tick 1".to_string(),
                markdown: false,
            },
            ChatCall::Edit {
                chat_id: CHAT,
                message_id: 1,
                text: "frozen 1".to_string(),
                markdown: false,
            },
        ]
    );
    // Only the freeze delay elapsed
    assert_eq!(started.elapsed(), INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_edit_in_order_then_freeze() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 4096, true, 3);
    let started = Instant::now();

    let script = scripted(vec![Ok(1), Ok(2), Ok(3)]);
    live.present(CHAT, 0u32, counter_view(), script).await;

    finish(&tracker).await;

    assert_eq!(chat.sent(), vec!["tick 0".to_string()]);
    assert_eq!(
        chat.edits(),
        vec![
            (1, "tick 1".to_string()),
            (1, "tick 2".to_string()),
            (1, "tick 3".to_string()),
            (1, "frozen 3".to_string()),
        ]
    );
    assert_eq!(started.elapsed(), INTERVAL * 4);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_previous_view() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 4096, true, 3);

    live.present(
        CHAT,
        0u32,
        counter_view(),
        scripted(vec![Ok(10), Err("daemon down"), Err("daemon down")]),
    )
    .await;
    finish(&tracker).await;

    // No edit for the failed ticks; the freeze uses the last good value
    assert_eq!(
        chat.edits(),
        vec![(1, "tick 10".to_string()), (1, "frozen 10".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_first_fetch_freezes_initial_value() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 4096, true, 1);

    live.present(CHAT, 5u32, counter_view(), scripted(vec![Err("timeout")]))
        .await;
    finish(&tracker).await;

    assert_eq!(chat.edits(), vec![(1, "frozen 5".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_live_sends_once() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 4096, false, 5);
    let fetches = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&fetches);

    let handle = live
        .present(CHAT, 1u32, counter_view(), move || {
            counted.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok::<u32, &'static str>(2))
        })
        .await;
    finish(&tracker).await;

    assert!(handle.is_some());
    assert_eq!(chat.sent(), vec!["tick 1".to_string()]);
    assert!(chat.edits().is_empty());
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_edit_failures_do_not_stop_the_session() {
    let chat = FakeChat::new();
    chat.fail_edits(true);
    let (live, tracker) = controller(&chat, 4096, true, 2);
    let fetches = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&fetches);

    live.present(CHAT, 1u32, counter_view(), move || {
        let n = counted.fetch_add(1, Ordering::SeqCst) as u32;
        std::future::ready(Ok::<u32, &'static str>(n))
    })
    .await;
    finish(&tracker).await;

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert!(chat.edits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_starts_no_session() {
    let chat = FakeChat::new();
    chat.fail_sends(true);
    let (live, tracker) = controller(&chat, 4096, true, 3);
    let fetches = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&fetches);

    let handle = live
        .present(CHAT, 1u32, counter_view(), move || {
            counted.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok::<u32, &'static str>(2))
        })
        .await;
    finish(&tracker).await;

    assert_eq!(handle, None);
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
    assert!(chat.edits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_chunked_initial_send_edits_last_chunk() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 10, true, 1);
    let view = LiveView::new(
        false,
        |lines: &Vec<&'static str>| lines.concat(),
        |_: &Vec<&'static str>| "done".to_string(),
    );

    let handle = live
        .present(CHAT, vec!["aaaa\n", "bbbb\n", "cccc\n"], view, || {
            std::future::ready(Ok::<_, &'static str>(vec!["short\n"]))
        })
        .await;
    finish(&tracker).await;

    assert_eq!(
        chat.sent(),
        vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]
    );
    assert_eq!(handle.map(|h| h.message_id), Some(2));
    assert_eq!(
        chat.edits(),
        vec![(2, "short\n".to_string()), (2, "done".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_oversized_and_empty_renders_are_skipped() {
    let chat = FakeChat::new();
    let (live, tracker) = controller(&chat, 10, true, 2);
    let view = LiveView::new(false, |s: &String| s.clone(), |_: &String| String::new());

    live.present(
        CHAT,
        "start".to_string(),
        view,
        scripted_strings(vec!["far too long for one message", ""]),
    )
    .await;
    finish(&tracker).await;

    assert_eq!(chat.sent(), vec!["start".to_string()]);
    assert!(chat.edits().is_empty());
}

fn scripted_strings(
    values: Vec<&'static str>,
) -> impl FnMut() -> std::future::Ready<Result<String, &'static str>> + Send + 'static {
    let script = Arc::new(Mutex::new(VecDeque::from(values)));
    move || {
        let next = script
            .lock()
            .unwrap()
            .pop_front()
            .map(str::to_string)
            .ok_or("script exhausted");
        std::future::ready(next)
    }
}
