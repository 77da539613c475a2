use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ingest::feed::parse_feed;
use crate::ingest::types::{FeedFetcher, FeedItem};

/// Serves canned XML documents keyed by URL. Unknown URLs fail like an
/// unreachable host would.
#[derive(Default)]
pub struct FixtureFetcher {
    docs: Mutex<HashMap<String, String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(self, url: &str, xml: &str) -> Self {
        self.set_doc(url, xml);
        self
    }

    /// Replace the document served for `url` (e.g. a feed that gained items).
    pub fn set_doc(&self, url: &str, xml: &str) {
        self.docs
            .lock()
            .expect("fixture mutex poisoned")
            .insert(url.to_string(), xml.to_string());
    }
}

#[async_trait]
impl FeedFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        let doc = self
            .docs
            .lock()
            .expect("fixture mutex poisoned")
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no fixture for {url}"))?;
        parse_feed(&doc)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
