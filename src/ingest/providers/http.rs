use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use std::time::Duration;

use crate::ingest::feed::parse_feed;
use crate::ingest::types::{FeedFetcher, FeedItem};

/// Fetches feeds over HTTP(S) and parses them as RSS/Atom.
#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        let t0 = std::time::Instant::now();
        tracing::debug!(url, "fetching feed");

        let body = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("feed http get {url}"))?
            .error_for_status()
            .with_context(|| format!("feed non-2xx from {url}"))?
            .text()
            .await
            .context("feed http .text()")?;

        let items = parse_feed(&body).with_context(|| format!("parsing feed {url}"))?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("relay_fetch_ms").record(ms);
        tracing::debug!(url, items = items.len(), "parsed feed");
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
