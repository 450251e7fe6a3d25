//! Tolerant extraction of articles from the raw RSS document.
//!
//! The document is treated as semi-structured text rather than XML: `<item>`
//! blocks are located by pattern, and `title`, `description` and `pubDate`
//! are pulled out of each block independently. A feed with stray markup or a
//! truncated tail still yields every intact item.
//!
//! # Skip policy
//!
//! An item without a `pubDate`, or with one that parses as neither RFC-2822
//! nor RFC-3339, is skipped entirely. Everything else is kept, with empty
//! strings standing in for a missing title or description.

use crate::models::ArticleRecord;
use crate::tokenizer::strip_tags;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<item(?:\s[^>]*)?>(.*?)</item>").expect("item regex"));
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<title(?:\s[^>]*)?>\s*<!\[CDATA\[(.*?)\]\]>\s*</title>|<title(?:\s[^>]*)?>(.*?)</title>")
        .expect("title regex")
});
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<description(?:\s[^>]*)?>\s*<!\[CDATA\[(.*?)\]\]>\s*</description>|<description(?:\s[^>]*)?>(.*?)</description>")
        .expect("description regex")
});
static PUB_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<pubDate>\s*([^<]+?)\s*</pubDate>").expect("pubDate regex"));

/// Lazily yield one [`ArticleRecord`] per intact `<item>` block.
pub fn extract_items(document: &str) -> impl Iterator<Item = ArticleRecord> + '_ {
    ITEM_RE
        .captures_iter(document)
        .filter_map(|caps| caps.get(1).and_then(|block| parse_item(block.as_str())))
}

/// Build a record from the inner text of one `<item>` block.
///
/// Returns `None` when the publish date is missing or unparsable.
pub fn parse_item(block: &str) -> Option<ArticleRecord> {
    let Some(raw_date) = PUB_DATE_RE.captures(block).and_then(|c| c.get(1)) else {
        debug!("Item without pubDate; skipping");
        return None;
    };
    let Some(published_at) = parse_pub_date(raw_date.as_str()) else {
        debug!(pub_date = %raw_date.as_str(), "Unparsable pubDate; skipping item");
        return None;
    };

    let title = field(&TITLE_RE, block).trim().to_string();
    let description = strip_tags(field(&DESCRIPTION_RE, block)).trim().to_string();

    Some(ArticleRecord {
        title,
        description,
        published_at,
    })
}

/// Text of a field, preferring the CDATA-wrapped form when both match.
fn field<'a>(re: &Regex, block: &'a str) -> &'a str {
    re.captures(block)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Parse a feed timestamp: RFC-2822 as published, RFC-3339 as a courtesy.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Медуза</title>
    <item>
      <title><![CDATA[Первая <новость>]]></title>
      <description><![CDATA[<p>Описание <b>первой</b> новости</p>]]></description>
      <pubDate>Mon, 20 Oct 2025 10:00:00 +0300</pubDate>
    </item>
    <item>
      <title>Second story</title>
      <description>Plain &lt;i&gt;text&lt;/i&gt; description</description>
      <pubDate>Tue, 21 Oct 2025 08:15:00 GMT</pubDate>
    </item>
    <item>
      <title>No date at all</title>
      <description>Dropped</description>
    </item>
    <item>
      <title>Broken date</title>
      <pubDate>not a date</pubDate>
    </item>
    <item>
      <title>Truncated tail
"#;

    #[test]
    fn test_extracts_intact_items_only() {
        let items: Vec<_> = extract_items(FEED).collect();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Первая <новость>");
        assert_eq!(items[0].description, "Описание первой новости");
        assert_eq!(
            items[0].published_at,
            Utc.with_ymd_and_hms(2025, 10, 20, 7, 0, 0).unwrap()
        );

        assert_eq!(items[1].title, "Second story");
        assert_eq!(items[1].description, "Plain &lt;i&gt;text&lt;/i&gt; description");
        assert_eq!(
            items[1].published_at,
            Utc.with_ymd_and_hms(2025, 10, 21, 8, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_channel_title_is_not_an_item() {
        let items: Vec<_> = extract_items(FEED).collect();
        assert!(items.iter().all(|item| item.title != "Медуза"));
    }

    #[test]
    fn test_cdata_form_takes_precedence() {
        let block = "<title><![CDATA[Wrapped]]></title><pubDate>Tue, 21 Oct 2025 08:15:00 GMT</pubDate>";
        assert_eq!(parse_item(block).unwrap().title, "Wrapped");
    }

    #[test]
    fn test_missing_description_is_empty() {
        let block = "<title>Only a title</title><pubDate>Tue, 21 Oct 2025 08:15:00 GMT</pubDate>";
        let record = parse_item(block).unwrap();
        assert_eq!(record.title, "Only a title");
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_item_with_attributes() {
        let doc = r#"<item rdf:about="x"><title>Hi there</title><pubDate>2025-10-21T10:00:00Z</pubDate></item>"#;
        let items: Vec<_> = extract_items(doc).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Hi there");
    }

    #[test]
    fn test_parse_pub_date_rejects_garbage() {
        assert!(parse_pub_date("yesterday").is_none());
        assert!(parse_pub_date("").is_none());
        assert!(parse_pub_date(" Tue, 21 Oct 2025 08:15:00 +0000 ").is_some());
    }
}
