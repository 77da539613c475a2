//! Fetch one feed, run an extraction rule over it from epoch zero and print
//! the posts that would be queued. Nothing is sent.
//!
//! Usage: `feed_probe <pixiv|yandere> <url>`

use chrono::DateTime;
use imageboard_relay::ingest::providers::http::HttpFeedFetcher;
use imageboard_relay::ingest::types::FeedFetcher;
use imageboard_relay::Rule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let (Some(kind), Some(url)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: feed_probe <pixiv|yandere> <url>");
    };
    let rule = Rule::from_tag(&kind).ok_or_else(|| anyhow::anyhow!("unsupported type {kind}"))?;

    let fetcher = HttpFeedFetcher::new(reqwest::Client::new()).with_timeout(20);
    let items = fetcher.fetch(&url).await?;
    let ex = rule.apply(&items, DateTime::UNIX_EPOCH);

    println!("{} items, {} posts, watermark {}", items.len(), ex.posts.len(), ex.watermark);
    for p in &ex.posts {
        println!("{}", serde_json::to_string_pretty(p)?);
    }
    Ok(())
}
