//! Configured feeds and their watermarks.

use chrono::{DateTime, Utc};

use crate::config::FeedConfig;
use crate::rules::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    pub rule: Rule,
    /// Newest publish time already processed.
    pub watermark: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// Build from config, resolving each feed type once. Unsupported types
    /// are logged and skipped.
    pub fn from_config(feeds: &[FeedConfig], start: DateTime<Utc>) -> Self {
        let mut reg = Self::default();
        for f in feeds {
            match Rule::from_tag(&f.kind) {
                Some(rule) => reg.register(&f.url, rule, start),
                None => {
                    tracing::error!(kind = %f.kind, url = %f.url, "unsupported feed type, skipping");
                }
            }
        }
        reg
    }

    pub fn register(&mut self, url: &str, rule: Rule, watermark: DateTime<Utc>) {
        tracing::info!(url, rule = rule.name(), %watermark, "registered source");
        self.sources.push(Source {
            url: url.to_string(),
            rule,
            watermark,
        });
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Source> {
        self.sources.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(kind: &str, url: &str) -> FeedConfig {
        FeedConfig {
            kind: kind.into(),
            url: url.into(),
        }
    }

    #[test]
    fn unsupported_types_are_skipped_without_affecting_others() {
        let start = DateTime::UNIX_EPOCH;
        let reg = SourceRegistry::from_config(
            &[
                feed("pixiv", "https://a"),
                feed("tumblr", "https://b"),
                feed("image-board-b", "https://c"),
            ],
            start,
        );
        let got: Vec<_> = reg.iter().map(|s| (s.url.as_str(), s.rule)).collect();
        assert_eq!(got, [("https://a", Rule::Pixiv), ("https://c", Rule::Yandere)]);
        assert!(reg.iter().all(|s| s.watermark == start));
    }
}
