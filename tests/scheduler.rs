// tests/scheduler.rs
use chrono::DateTime;
use imageboard_relay::ingest::providers::fixture::FixtureFetcher;
use imageboard_relay::notify::RecordingMessenger;
use imageboard_relay::registry::SourceRegistry;
use imageboard_relay::scheduler::{self, SchedulerCfg};
use imageboard_relay::{Relay, Rule};
use std::sync::Arc;
use std::time::Duration;

const URL: &str = "https://rsshub.example/yande.re/post/popular_recent";
const YANDERE_XML: &str = include_str!("fixtures/yandere_rss.xml");

fn relay(messenger: Arc<RecordingMessenger>) -> Relay {
    let mut reg = SourceRegistry::default();
    reg.register(URL, Rule::Yandere, DateTime::UNIX_EPOCH);
    let fetcher = Arc::new(FixtureFetcher::new().with_doc(URL, YANDERE_XML));
    Relay::new(reg, fetcher, messenger)
}

#[tokio::test(start_paused = true)]
async fn timers_poll_then_drain_one_post_per_tick() {
    let messenger = Arc::new(RecordingMessenger::new());
    let cfg = SchedulerCfg {
        poll_every: Duration::from_secs(60),
        dispatch_every: Duration::from_secs(1),
    };

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(scheduler::run_until(relay(messenger.clone()), cfg, async {
        let _ = rx.await;
    }));

    // dispatch ticks before the first poll find nothing to send
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(messenger.captions().is_empty());

    // first poll at 60s queues two posts; ticks at 61s and 62s drain them
    tokio::time::sleep(Duration::from_secs(33)).await;
    assert_eq!(
        messenger.captions(),
        ["Tags: sky landscape", "Tags: cat & dog"]
    );

    tx.send(()).unwrap();
    let relay = task.await.unwrap();
    assert!(relay.queue().is_empty());
}

#[tokio::test]
async fn debug_once_polls_without_sending() {
    let messenger = Arc::new(RecordingMessenger::new());
    let relay = scheduler::run_debug_once(relay(messenger.clone())).await;

    assert_eq!(relay.queue().len(), 2);
    assert!(messenger.captions().is_empty());
}
