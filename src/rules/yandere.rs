use once_cell::sync::OnceCell;
use regex::Regex;

use super::{clean_title, PostRecord};
use crate::ingest::types::FeedItem;

fn sample_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)https://files\.yande\.re/sample/([^\s"'<>]+)/([^\s"'<>]+)\.(jpg|png|gif)"#)
            .unwrap()
    })
}

/// Map a sample URL to the original-resolution image URL.
pub fn full_resolution_url(sample: &str) -> String {
    sample
        .replacen("%20sample", "", 1)
        .replacen("sample", "image", 1)
}

/// One post per item, built from the first sample link only.
pub(super) fn extract(item: &FeedItem, out: &mut Vec<PostRecord>) {
    let Some(m) = sample_re().find(&item.content) else {
        return;
    };
    let Some(link) = item.link.as_deref() else {
        tracing::debug!(title = %item.title, "yandere item without link, skipping");
        return;
    };

    let preview = m.as_str().to_string();
    out.push(PostRecord {
        full_url: full_resolution_url(&preview),
        preview_url: preview,
        caption: format!("Tags: {}", clean_title(&item.title)),
        origin_url: link.to_string(),
    });
}
