// tests/relay_poll.rs
use chrono::{DateTime, TimeZone, Utc};
use imageboard_relay::ingest::providers::fixture::FixtureFetcher;
use imageboard_relay::notify::RecordingMessenger;
use imageboard_relay::registry::SourceRegistry;
use imageboard_relay::{Relay, Rule};
use std::sync::Arc;

const PIXIV_XML: &str = include_str!("fixtures/pixiv_rss.xml");
const YANDERE_XML: &str = include_str!("fixtures/yandere_rss.xml");
const PIXIV_URL: &str = "https://rsshub.example/pixiv/user/bookmarks/1";
const YANDERE_URL: &str = "https://rsshub.example/yande.re/post/popular_recent";

fn registry(start: DateTime<Utc>) -> SourceRegistry {
    let mut reg = SourceRegistry::default();
    reg.register(PIXIV_URL, Rule::Pixiv, start);
    reg.register(YANDERE_URL, Rule::Yandere, start);
    reg
}

fn relay_with(fetcher: Arc<FixtureFetcher>, start: DateTime<Utc>) -> Relay {
    Relay::new(registry(start), fetcher, Arc::new(RecordingMessenger::new()))
}

fn both_feeds() -> Arc<FixtureFetcher> {
    Arc::new(
        FixtureFetcher::new()
            .with_doc(PIXIV_URL, PIXIV_XML)
            .with_doc(YANDERE_URL, YANDERE_XML),
    )
}

#[tokio::test]
async fn first_poll_from_epoch_queues_in_registry_then_feed_order() {
    let mut relay = relay_with(both_feeds(), DateTime::UNIX_EPOCH);

    let report = relay.poll_once().await;
    assert_eq!(report.polled, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.queued, 6);

    let captions: Vec<_> = relay.queue().iter().map(|p| p.caption.clone()).collect();
    assert_eq!(
        captions,
        [
            "Sunset",
            "Triptych - P1",
            "Triptych - P2",
            "Triptych - P3",
            "Tags: sky landscape",
            "Tags: cat & dog",
        ]
    );

    let sunset = relay.queue().iter().next().unwrap();
    assert_eq!(
        sunset.preview_url,
        "https://i.pximg.net/img-master/img/2023/03/01/19/00/00/12345_p0_master1200.jpg"
    );
    assert_eq!(sunset.origin_url, "https://www.pixiv.net/artworks/12345");

    let sky = relay.queue().iter().nth(4).unwrap();
    assert_eq!(
        sky.full_url,
        "https://files.yande.re/image/ab12/yande.re%201001%20sky%20landscape.jpg"
    );
    assert_eq!(sky.origin_url, "https://yande.re/post/show/1001");
}

#[tokio::test]
async fn watermarks_advance_to_newest_item_including_text_only() {
    let mut relay = relay_with(both_feeds(), DateTime::UNIX_EPOCH);
    relay.poll_once().await;

    let marks: Vec<_> = relay.sources().iter().map(|s| s.watermark).collect();
    assert_eq!(
        marks,
        [
            Utc.with_ymd_and_hms(2023, 3, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 3, 2, 8, 0, 0).unwrap(),
        ]
    );
}

#[tokio::test]
async fn second_poll_of_unchanged_feeds_queues_nothing() {
    let mut relay = relay_with(both_feeds(), DateTime::UNIX_EPOCH);
    relay.poll_once().await;
    let depth = relay.queue().len();

    let report = relay.poll_once().await;
    assert_eq!(report.queued, 0);
    assert_eq!(relay.queue().len(), depth);
}

#[tokio::test]
async fn only_items_newer_than_watermark_are_queued() {
    // between Triptych (09:00) and Sunset (10:00)
    let start = Utc.with_ymd_and_hms(2023, 3, 1, 9, 30, 0).unwrap();
    let mut relay = relay_with(both_feeds(), start);

    relay.poll_once().await;
    let captions: Vec<_> = relay.queue().iter().map(|p| p.caption.clone()).collect();
    assert_eq!(captions, ["Sunset", "Tags: sky landscape"]);
}

#[tokio::test]
async fn failing_source_is_isolated_and_keeps_its_watermark() {
    let fetcher = Arc::new(FixtureFetcher::new().with_doc(YANDERE_URL, YANDERE_XML));
    let mut relay = relay_with(fetcher.clone(), DateTime::UNIX_EPOCH);

    let report = relay.poll_once().await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.queued, 2);

    let pixiv = relay.sources().iter().find(|s| s.rule == Rule::Pixiv).unwrap();
    assert_eq!(pixiv.watermark, DateTime::UNIX_EPOCH);

    // the feed recovers on the next cycle and nothing was lost
    fetcher.set_doc(PIXIV_URL, PIXIV_XML);
    let report = relay.poll_once().await;
    assert_eq!(report.failed, 0);
    assert_eq!(report.queued, 4);
}

#[tokio::test]
async fn malformed_feed_counts_as_failure() {
    let fetcher = Arc::new(
        FixtureFetcher::new()
            .with_doc(PIXIV_URL, "<html><body>502 Bad Gateway</body></html>")
            .with_doc(YANDERE_URL, YANDERE_XML),
    );
    let mut relay = relay_with(fetcher, DateTime::UNIX_EPOCH);
    let report = relay.poll_once().await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.queued, 2);
}

#[tokio::test]
async fn new_item_on_later_poll_is_appended_after_existing_posts() {
    let fetcher = both_feeds();
    let mut relay = relay_with(fetcher.clone(), DateTime::UNIX_EPOCH);
    relay.poll_once().await;

    let newer = PIXIV_XML.replacen(
        "<item>",
        r#"<item>
      <title><![CDATA[Dawn]]></title>
      <description><![CDATA[<img src="https://pixiv.cat/99999.png">]]></description>
      <pubDate>Wed, 01 Mar 2023 11:00:00 +0000</pubDate>
      <link>https://www.pixiv.net/artworks/99999</link>
    </item>
    <item>"#,
        1,
    );
    fetcher.set_doc(PIXIV_URL, &newer);

    let report = relay.poll_once().await;
    assert_eq!(report.queued, 1);
    assert_eq!(relay.queue().iter().last().unwrap().caption, "Dawn");
}
