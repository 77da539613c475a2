use chrono::{DateTime, Duration, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use super::{clean_title, PostRecord};
use crate::ingest::types::FeedItem;

/// pximg paths are dated in Tokyo time.
const JST_OFFSET_HOURS: i64 = 9;

fn artwork_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)https://pixiv\.cat/(\d+)(?:-(\d+))?\.(jpg|png|gif)").unwrap()
    })
}

/// `YYYY/MM/DD/HH/mm/ss` of the publish time shifted to JST.
pub fn preview_date_path(published: DateTime<Utc>) -> String {
    (published + Duration::hours(JST_OFFSET_HOURS))
        .format("%Y/%m/%d/%H/%M/%S")
        .to_string()
}

/// One post per `pixiv.cat` link in the item body.
pub(super) fn extract(item: &FeedItem, out: &mut Vec<PostRecord>) {
    let date_path = preview_date_path(item.published);
    let title = clean_title(&item.title);

    for caps in artwork_re().captures_iter(&item.content) {
        let id = &caps[1];
        let ext = &caps[3];
        // links carry a 1-based page number, pximg wants 0-based
        let page = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        let index = page.map(|p| p.saturating_sub(1)).unwrap_or(0);

        let caption = match page {
            Some(p) => format!("{title} - P{p}"),
            None => title.clone(),
        };

        out.push(PostRecord {
            preview_url: format!(
                "https://i.pximg.net/img-master/img/{date_path}/{id}_p{index}_master1200.{ext}"
            ),
            full_url: caps[0].to_string(),
            caption,
            origin_url: format!("https://www.pixiv.net/artworks/{id}"),
        });
    }
}
