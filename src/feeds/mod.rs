//! Feed ingestion: poll RSS/Atom feeds and turn their entries into categorized articles.
//!
//! Each configured [`FeedSource`] carries a default category. Entries are
//! re-categorized by keyword with [`classify::categorize`], falling back to
//! that default. Feeds are fetched concurrently but reported in
//! configuration order, and a feed that fails is logged and skipped.
//!
//! | Source | Default category |
//! |--------|------------------|
//! | Reuters / BBC World / NPR / AP | `general` |
//! | Reuters / BBC Politics, Politico | `politics` |
//! | Reuters / BBC Business, CNBC | `economics` |
//! | Reuters Technology, TechCrunch, Ars Technica | `technology` |
//! | ESPN, BBC Sport | `sports` |
//! | Reuters Health | `health` |
//! | BBC / NPR Science | `science` |
//! | Reuters / BBC Entertainment | `entertainment` |

pub mod classify;
pub mod rss;

use crate::models::{Article, RawArticle};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Feeds fetched at the same time.
const PARALLEL_FEEDS: usize = 8;

/// A feed to poll.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub default_category: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str, default_category: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            default_category: default_category.to_string(),
        }
    }
}

/// Built-in feed list used when the config file names none.
pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("Reuters Top News", "https://feeds.reuters.com/reuters/topNews", "general"),
        FeedSource::new("BBC World", "http://feeds.bbci.co.uk/news/world/rss.xml", "general"),
        FeedSource::new("NPR News", "https://feeds.npr.org/1001/rss.xml", "general"),
        FeedSource::new("Associated Press", "https://rsshub.app/apnews/topics/apf-topnews", "general"),
        FeedSource::new("Reuters Politics", "https://feeds.reuters.com/Reuters/PoliticsNews", "politics"),
        FeedSource::new("BBC Politics", "http://feeds.bbci.co.uk/news/politics/rss.xml", "politics"),
        FeedSource::new("Politico", "https://rss.politico.com/politics-news.xml", "politics"),
        FeedSource::new("Reuters Business", "https://feeds.reuters.com/reuters/businessNews", "economics"),
        FeedSource::new("BBC Business", "http://feeds.bbci.co.uk/news/business/rss.xml", "economics"),
        FeedSource::new(
            "CNBC Top News",
            "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=100003114",
            "economics",
        ),
        FeedSource::new("Reuters Technology", "https://feeds.reuters.com/reuters/technologyNews", "technology"),
        FeedSource::new("TechCrunch", "https://techcrunch.com/feed/", "technology"),
        FeedSource::new("Ars Technica", "https://feeds.arstechnica.com/arstechnica/index", "technology"),
        FeedSource::new("ESPN Top Headlines", "https://www.espn.com/espn/rss/news", "sports"),
        FeedSource::new("BBC Sport", "http://feeds.bbci.co.uk/sport/rss.xml", "sports"),
        FeedSource::new("Reuters Health", "https://feeds.reuters.com/reuters/healthNews", "health"),
        FeedSource::new("BBC Science", "http://feeds.bbci.co.uk/news/science_and_environment/rss.xml", "science"),
        FeedSource::new("NPR Science", "https://feeds.npr.org/1007/rss.xml", "science"),
        FeedSource::new("Reuters Entertainment", "https://feeds.reuters.com/reuters/entertainment", "entertainment"),
        FeedSource::new(
            "BBC Entertainment",
            "http://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml",
            "entertainment",
        ),
    ]
}

/// Fetch every feed and return their articles, feed order first, entry order second.
///
/// Articles whose link was already seen in an earlier feed are dropped.
#[instrument(level = "info", skip_all, fields(feeds = feeds.len()))]
pub async fn fetch_all(client: &Client, feeds: &[FeedSource]) -> Vec<Article> {
    let per_feed: Vec<Vec<Article>> = stream::iter(feeds)
        .map(|feed| async move {
            match fetch_feed(client, feed).await {
                Ok(articles) => {
                    info!(feed = %feed.name, count = articles.len(), "Fetched feed");
                    articles
                }
                Err(e) => {
                    warn!(feed = %feed.name, url = %feed.url, error = %e, "Feed fetch failed; skipping");
                    Vec::new()
                }
            }
        })
        .buffered(PARALLEL_FEEDS)
        .collect()
        .await;

    let total: usize = per_feed.iter().map(Vec::len).sum();
    let articles: Vec<Article> = per_feed
        .into_iter()
        .flatten()
        .unique_by(|a| a.link.clone())
        .collect();
    info!(
        total,
        unique = articles.len(),
        "Collected articles from feeds"
    );
    articles
}

/// Fetch and parse a single feed.
#[instrument(level = "debug", skip_all, fields(feed = %feed.name))]
pub async fn fetch_feed(client: &Client, feed: &FeedSource) -> Result<Vec<Article>, Box<dyn Error>> {
    let body = client
        .get(&feed.url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let entries = rss::parse_feed(&body)?;
    debug!(entries = entries.len(), "Parsed feed");
    Ok(entries
        .into_iter()
        .map(|entry| entry_to_article(feed, entry))
        .collect())
}

fn entry_to_article(feed: &FeedSource, entry: rss::FeedEntry) -> Article {
    let category = classify::categorize(&entry.title, &entry.summary, &feed.default_category);
    Article::new(
        &entry.title,
        &entry.link,
        &feed.name,
        &category,
        entry.published_at,
    )
}

/// Read a JSON array of article records, as an alternative to polling feeds.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_article_file(path: &Path) -> Result<Vec<Article>, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let records: Vec<RawArticle> = serde_json::from_str(&raw)?;
    info!(count = records.len(), "Loaded articles from file");
    Ok(records.into_iter().map(Article::from).collect())
}
