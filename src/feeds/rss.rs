//! RSS 2.0, RSS 1.0 (RDF) and Atom parsing.
//!
//! Documents are parsed with `feed_rs`, which normalizes every format and its
//! common namespaces (`atom:`, `media:`, `dc:`) into one entry model. This
//! module only picks the fields a newsletter needs from it.

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseFeedError};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::truncate_chars;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Characters of the cleaned summary kept for classification.
const SUMMARY_CHARS: usize = 200;

/// One entry of a feed, normalized across formats.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Tag-stripped description, cut to 200 characters plus `...`.
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Parse an RSS or Atom document into entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, ParseFeedError> {
    let feed = parser::parse(xml.as_bytes())?;
    Ok(feed.entries.into_iter().map(feed_entry).collect())
}

fn feed_entry(entry: Entry) -> FeedEntry {
    let link = entry_link(&entry);
    let summary = entry
        .summary
        .as_ref()
        .map(|s| s.content.as_str())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.as_deref()))
        .unwrap_or_default();
    FeedEntry {
        title: entry_title(entry.title.as_ref().map(|t| t.content.as_str())),
        link,
        summary: clean_summary(summary),
        published_at: entry.published.or(entry.updated),
    }
}

/// The `alternate` (or unmarked) link, else the first non-empty one, else an
/// id that looks like a URL.
fn entry_link(entry: &Entry) -> String {
    let usable = || entry.links.iter().filter(|l| !l.href.trim().is_empty());
    if let Some(link) = usable().find(|l| {
        l.rel
            .as_deref()
            .is_none_or(|rel| rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
    }) {
        return link.href.trim().to_string();
    }
    if let Some(link) = usable().next() {
        return link.href.trim().to_string();
    }
    let id = entry.id.trim();
    if id.starts_with("http://") || id.starts_with("https://") {
        id.to_string()
    } else {
        String::new()
    }
}

fn entry_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => "No Title".to_string(),
    }
}

/// Strip markup from a description and cut it to 200 characters plus `...`.
pub fn clean_summary(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, "");
    let stripped = stripped.trim();
    if stripped.chars().count() > SUMMARY_CHARS {
        format!("{}...", truncate_chars(stripped, SUMMARY_CHARS))
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Example World</title>
    <link>https://example.com</link>
    <atom:link href="https://example.com/rss.xml" rel="self"/>
    <description>World news</description>
    <item>
      <title><![CDATA[Storm makes landfall]]></title>
      <link>https://example.com/storm</link>
      <description><![CDATA[<p>The storm hit the <b>coast</b> overnight.</p>]]></description>
      <pubDate>Tue, 13 Oct 2026 08:30:00 GMT</pubDate>
      <guid isPermaLink="false">storm-1</guid>
    </item>
    <item>
      <title>Markets rally</title>
      <link>https://example.com/markets</link>
      <description>Stocks &amp; bonds rose.</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Tech</title>
  <id>urn:example:tech</id>
  <updated>2026-10-13T09:00:00Z</updated>
  <link href="https://tech.example.com/" rel="alternate"/>
  <entry>
    <id>urn:example:chip</id>
    <title type="html">New chip unveiled</title>
    <link rel="self" href="https://tech.example.com/api/1"/>
    <link rel="alternate" href="https://tech.example.com/chip"/>
    <summary type="html">&lt;p&gt;Faster and cooler.&lt;/p&gt;</summary>
    <updated>2026-10-13T09:00:00Z</updated>
  </entry>
  <entry>
    <id>urn:example:untitled</id>
    <link href="https://tech.example.com/untitled"/>
    <updated>2026-10-13T10:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Storm makes landfall");
        assert_eq!(entries[0].link, "https://example.com/storm");
        assert_eq!(entries[0].summary, "The storm hit the coast overnight.");
        assert_eq!(
            entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 13, 8, 30, 0).unwrap())
        );

        assert_eq!(entries[1].title, "Markets rally");
        assert_eq!(entries[1].summary, "Stocks & bonds rose.");
    }

    #[test]
    fn test_item_with_atom_link_keeps_article_link() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Wire</title>
    <link>https://wire.example.com</link>
    <description>d</description>
    <item>
      <title>Bridge reopens</title>
      <link>https://wire.example.com/bridge</link>
      <atom:link href="https://wire.example.com/bridge.json" rel="self"/>
      <description>Traffic flows again.</description>
    </item>
  </channel>
</rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Bridge reopens");
        assert_eq!(entries[0].link, "https://wire.example.com/bridge");
    }

    #[test]
    fn test_item_with_media_elements_parses() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Pictures</title>
    <link>https://pics.example.com</link>
    <description>d</description>
    <item>
      <title>Eclipse over the desert</title>
      <media:title>Photo: eclipse</media:title>
      <link>https://pics.example.com/eclipse</link>
      <description>Crowds gathered at dawn.</description>
      <media:description>A dark disc over dunes</media:description>
    </item>
    <item>
      <title>Second story</title>
      <link>https://pics.example.com/second</link>
    </item>
  </channel>
</rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Eclipse over the desert");
        assert_eq!(entries[0].link, "https://pics.example.com/eclipse");
        assert_eq!(entries[0].summary, "Crowds gathered at dawn.");
        assert_eq!(entries[1].link, "https://pics.example.com/second");
    }

    #[test]
    fn test_rdf_item_reads_dublin_core_date() {
        let xml = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns="http://purl.org/rss/1.0/"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel rdf:about="https://science.example.com/">
    <title>Science</title>
    <link>https://science.example.com/</link>
    <description>d</description>
  </channel>
  <item rdf:about="https://science.example.com/comet">
    <title>Comet returns</title>
    <link>https://science.example.com/comet</link>
    <description>Visible next week.</description>
    <dc:date>2026-10-13T09:00:00Z</dc:date>
  </item>
</rdf:RDF>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Comet returns");
        assert_eq!(entries[0].link, "https://science.example.com/comet");
        assert_eq!(
            entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_feed(ATOM).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "New chip unveiled");
        assert_eq!(entries[0].link, "https://tech.example.com/chip");
        assert_eq!(entries[0].summary, "Faster and cooler.");
        assert_eq!(
            entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).unwrap())
        );

        assert_eq!(entries[1].title, "No Title");
        assert_eq!(entries[1].link, "https://tech.example.com/untitled");
        assert_eq!(entries[1].summary, "");
    }

    #[test]
    fn test_clean_summary_truncates() {
        let long = format!("<p>{}</p>", "x".repeat(250));
        let cleaned = clean_summary(&long);
        assert_eq!(cleaned, format!("{}...", "x".repeat(200)));
    }

    #[test]
    fn test_non_feed_document_is_error() {
        assert!(parse_feed("<html><body><p>not a feed</p></body></html>").is_err());
    }
}
