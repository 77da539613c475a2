//! Extraction rules: turn feed items into [`PostRecord`]s.
//!
//! Each rule is a pure function of a feed snapshot and the source's
//! watermark. A rule never performs I/O, so every variant can be exercised
//! with hand-written [`FeedItem`]s.

pub mod pixiv;
pub mod yandere;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ingest::types::FeedItem;

/// Normalized unit of content awaiting delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub preview_url: String,
    pub full_url: String,
    pub caption: String,
    pub origin_url: String,
}

/// Result of applying a rule to one feed snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub posts: Vec<PostRecord>,
    pub watermark: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Pixiv artworks mirrored through `pixiv.cat` links.
    Pixiv,
    /// yande.re posts linking to `files.yande.re/sample/...` images.
    Yandere,
}

impl Rule {
    /// Resolve a configured source type (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "pixiv" | "image-board-a" => Some(Rule::Pixiv),
            "yandere" | "image-board-b" => Some(Rule::Yandere),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Pixiv => "pixiv",
            Rule::Yandere => "yandere",
        }
    }

    /// Extract posts from items newer than `watermark`.
    ///
    /// The returned watermark is `max(watermark, newest item)`, whether or
    /// not the newest item produced a post.
    pub fn apply(&self, items: &[FeedItem], watermark: DateTime<Utc>) -> Extraction {
        let mut out = Extraction {
            posts: Vec::new(),
            watermark,
        };

        for item in items {
            if item.published <= watermark {
                continue;
            }
            out.watermark = out.watermark.max(item.published);

            match self {
                Rule::Pixiv => pixiv::extract(item, &mut out.posts),
                Rule::Yandere => yandere::extract(item, &mut out.posts),
            }
        }

        out
    }
}

/// Decode entities and trim a feed title for use in a caption.
pub(crate) fn clean_title(title: &str) -> String {
    html_escape::decode_html_entities(title).trim().to_string()
}
