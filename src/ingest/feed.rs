//! RSS 2.0 / Atom parsing into [`FeedItem`]s.
//!
//! Only the fields the extraction rules need are deserialized; everything
//! else in the document is ignored.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::borrow::Cow;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

use crate::ingest::types::FeedItem;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    // also catches `atom:link`; the first non-empty text wins
    #[serde(default)]
    link: Vec<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // `content:encoded`: the deserializer matches local names
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    content: Option<AtomText>,
    summary: Option<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse an RSS 2.0 or Atom document. Items without a usable publish time
/// are dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let xml_clean = decode_html_named_entities(xml);
    if is_atom(&xml_clean) {
        parse_atom(&xml_clean)
    } else {
        parse_rss(&xml_clean)
    }
}

fn parse_rss(s: &str) -> Result<Vec<FeedItem>> {
    let rss: Rss = from_str(s).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let Some(published) = it.pub_date.as_deref().and_then(parse_rfc2822) else {
            tracing::debug!(title = ?it.title, "rss item without parseable pubDate, skipping");
            continue;
        };
        out.push(FeedItem {
            published,
            title: it.title.unwrap_or_default(),
            content: it.content_encoded.or(it.description).unwrap_or_default(),
            link: it
                .link
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty())
                .map(str::to_string),
        });
    }
    Ok(out)
}

fn parse_atom(s: &str) -> Result<Vec<FeedItem>> {
    let feed: AtomFeed = from_str(s).context("parsing atom xml")?;

    let mut out = Vec::with_capacity(feed.entry.len());
    for e in feed.entry {
        let published = e
            .published
            .as_deref()
            .or(e.updated.as_deref())
            .and_then(parse_rfc3339);
        let Some(published) = published else {
            tracing::debug!("atom entry without parseable published/updated, skipping");
            continue;
        };

        let link = e
            .link
            .iter()
            .find(|l| l.rel.as_deref().unwrap_or("alternate") == "alternate")
            .or(e.link.first())
            .and_then(|l| l.href.clone());

        out.push(FeedItem {
            published,
            title: e.title.map(|t| t.value).unwrap_or_default(),
            content: e.content.or(e.summary).map(|t| t.value).unwrap_or_default(),
            link,
        });
    }
    Ok(out)
}

fn is_atom(s: &str) -> bool {
    !s.contains("<rss") && s.contains("<feed")
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .and_then(to_utc)
        // obsolete zone names ("GMT", "EST") show up in the wild
        .or_else(|| {
            DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .and_then(to_utc)
}

fn to_utc(dt: OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond())
}

const XML_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Rewrite HTML named entities (`&hellip;`, `&nbsp;`, ...) that XML does not
/// know into XML-safe text. The five XML entities are left alone and
/// unknown names get their `&` escaped, so the document stays parseable.
fn decode_html_named_entities(s: &str) -> Cow<'_, str> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]{1,31});").unwrap());

    re.replace_all(s, |caps: &Captures| {
        let name = &caps[1];
        if XML_ENTITIES.contains(&name) {
            return caps[0].to_string();
        }
        let decoded = html_escape::decode_html_entities(&caps[0]);
        if decoded == caps[0] {
            format!("&amp;{name};")
        } else {
            html_escape::encode_safe(&decoded).into_owned()
        }
    })
}
