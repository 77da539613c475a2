//! The controller: owns the source registry and the post queue, and runs
//! one poll cycle or one dispatch tick at a time.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::ingest::providers::http::HttpFeedFetcher;
use crate::ingest::types::FeedFetcher;
use crate::notify::telegram::TelegramNotifier;
use crate::notify::{Messenger, PhotoMessage};
use crate::queue::PostQueue;
use crate::registry::SourceRegistry;
use crate::rules::PostRecord;
use crate::telemetry::ensure_metrics_described;

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub polled: usize,
    pub failed: usize,
    pub queued: usize,
}

pub struct Relay {
    sources: SourceRegistry,
    queue: PostQueue,
    fetcher: Arc<dyn FeedFetcher>,
    messenger: Arc<dyn Messenger>,
}

/// Watermark for freshly registered sources: epoch zero in debug mode so
/// every existing item qualifies on the first poll.
pub fn initial_watermark(debug: bool, now: DateTime<Utc>) -> DateTime<Utc> {
    if debug {
        DateTime::UNIX_EPOCH
    } else {
        now
    }
}

impl Relay {
    pub fn new(
        sources: SourceRegistry,
        fetcher: Arc<dyn FeedFetcher>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        ensure_metrics_described();
        Self {
            sources,
            queue: PostQueue::new(),
            fetcher,
            messenger,
        }
    }

    /// Wire the HTTP fetcher and Telegram sender from configuration.
    pub fn from_config(cfg: &RelayConfig, now: DateTime<Utc>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("imageboard-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let sources = SourceRegistry::from_config(&cfg.feeds, initial_watermark(cfg.debug, now));
        if sources.is_empty() {
            tracing::warn!("no usable feeds configured");
        }

        let fetcher = HttpFeedFetcher::new(client.clone()).with_timeout(cfg.fetch_timeout_secs);
        let messenger = TelegramNotifier::from_config(client, &cfg.bot);
        Ok(Self::new(sources, Arc::new(fetcher), Arc::new(messenger)))
    }

    /// Fetch every source in registry order, advance its watermark and queue
    /// what its rule extracted. A failing source keeps its watermark and does
    /// not affect the others.
    pub async fn poll_once(&mut self) -> PollReport {
        let mut report = PollReport::default();

        for src in self.sources.iter_mut() {
            report.polled += 1;
            let items = match self.fetcher.fetch(&src.url).await {
                Ok(items) => items,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(error = ?e, url = %src.url, fetcher = self.fetcher.name(), "feed error");
                    counter!("relay_feed_errors_total").increment(1);
                    continue;
                }
            };

            let ex = src.rule.apply(&items, src.watermark);
            if ex.watermark > src.watermark {
                tracing::debug!(url = %src.url, from = %src.watermark, to = %ex.watermark, "watermark advanced");
            }
            src.watermark = ex.watermark;

            let n = self.queue.extend(ex.posts);
            report.queued += n;
            if n > 0 {
                tracing::info!(url = %src.url, rule = src.rule.name(), queued = n, "new posts");
            }
        }

        counter!("relay_polls_total").increment(1);
        counter!("relay_posts_queued_total").increment(report.queued as u64);
        gauge!("relay_queue_depth").set(self.queue.len() as f64);
        tracing::info!(
            polled = report.polled,
            failed = report.failed,
            queued = report.queued,
            depth = self.queue.len(),
            "poll cycle done"
        );
        report
    }

    /// Send the oldest queued post, if any. The post is gone from the queue
    /// whether or not delivery succeeded.
    pub async fn dispatch_once(&mut self) -> Option<PostRecord> {
        let post = self.queue.pop_oldest()?;
        let msg = PhotoMessage::from(&post);

        match self.messenger.send(&msg).await {
            Ok(()) => {
                tracing::debug!(caption = %post.caption, "dispatched");
            }
            Err(e) => {
                tracing::warn!(error = ?e, messenger = self.messenger.name(), caption = %post.caption, "send failed, dropping post");
                counter!("relay_send_failures_total").increment(1);
            }
        }

        counter!("relay_posts_dispatched_total").increment(1);
        gauge!("relay_queue_depth").set(self.queue.len() as f64);
        Some(post)
    }

    pub fn queue(&self) -> &PostQueue {
        &self.queue
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }
}
