// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One entry of a parsed feed, as consumed by the extraction rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub published: DateTime<Utc>,
    pub title: String,
    pub content: String, // raw markup body
    pub link: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse the feed at `url`; items keep document order.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &'static str;
}
