//! Data models for articles, category pools and the finished newsletter.
//!
//! - [`Article`]: one news item as it flows through the pipeline
//! - [`RawArticle`]: the record shape accepted from an input file
//! - [`CategoryPool`]: candidate articles grouped by category, in arrival order
//! - [`NewsletterDocument`]: the selected, summarized articles per category
//!
//! Articles are never mutated once built. Enrichment goes through
//! [`Article::with_summary`], which returns a new record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters of a title kept for display.
pub const MAX_TITLE_CHARS: usize = 100;

/// A single news article.
///
/// Two articles are the same article when their `title` and `link` match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Headline, truncated to [`MAX_TITLE_CHARS`] characters plus `...`.
    pub title: String,
    /// Canonical URL of the article.
    pub link: String,
    /// Human readable name of the feed the article came from.
    pub source: String,
    /// Topical bucket, e.g. `politics` or `technology`.
    pub category: String,
    /// Publication time reported by the feed, when it had a parseable one.
    pub published_at: Option<DateTime<Utc>>,
    /// Three-line summary, present only on enriched copies.
    pub summary: Option<String>,
}

impl Article {
    /// Build an article, truncating the title for display.
    pub fn new(
        title: &str,
        link: &str,
        source: &str,
        category: &str,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: display_title(title),
            link: link.to_string(),
            source: source.to_string(),
            category: category.to_string(),
            published_at,
            summary: None,
        }
    }

    /// Structural identity: same title and same link.
    #[cfg(test)]
    pub fn same_article(&self, other: &Article) -> bool {
        self.title == other.title && self.link == other.link
    }

    /// Return an enriched copy carrying `summary`. `self` is left untouched.
    pub fn with_summary(&self, summary: impl Into<String>) -> Article {
        Article {
            summary: Some(summary.into()),
            ..self.clone()
        }
    }
}

/// Truncate a headline to [`MAX_TITLE_CHARS`] characters, marking the cut with `...`.
pub fn display_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let kept: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{kept}...")
    } else {
        title.to_string()
    }
}

/// An article record as supplied by an input file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    #[serde(default = "unknown_source")]
    pub source: String,
    pub category: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

fn unknown_source() -> String {
    "Unknown".to_string()
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Article::new(
            &raw.title,
            &raw.link,
            &raw.source,
            &raw.category,
            raw.published_at,
        )
    }
}

/// Candidate articles grouped by category.
///
/// Categories keep the order in which they were first seen; articles inside a
/// category keep their arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPool {
    categories: Vec<(String, Vec<Article>)>,
}

impl CategoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group articles by their `category` field.
    pub fn from_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let mut pool = Self::new();
        for article in articles {
            pool.push(article);
        }
        pool
    }

    /// Append an article to its category, creating the category if needed.
    pub fn push(&mut self, article: Article) {
        match self
            .categories
            .iter_mut()
            .find(|(name, _)| *name == article.category)
        {
            Some((_, articles)) => articles.push(article),
            None => self
                .categories
                .push((article.category.clone(), vec![article])),
        }
    }

    /// Insert a whole category. An existing category with the same name is
    /// replaced in place, keeping its position.
    #[cfg(test)]
    pub fn insert(&mut self, category: impl Into<String>, articles: Vec<Article>) {
        let category = category.into();
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => *existing = articles,
            None => self.categories.push((category, articles)),
        }
    }

    /// Keep only the named categories, preserving order.
    pub fn retain_categories(&mut self, keep: &[String]) {
        self.categories.retain(|(name, _)| keep.contains(name));
    }

    #[cfg(test)]
    pub fn get(&self, category: &str) -> Option<&[Article]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, articles)| articles.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Article])> {
        self.categories
            .iter()
            .map(|(name, articles)| (name.as_str(), articles.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Total number of articles across every category.
    pub fn article_count(&self) -> usize {
        self.categories.iter().map(|(_, a)| a.len()).sum()
    }
}

/// One rendered category: its name and the enriched articles chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategorySection {
    pub category: String,
    pub articles: Vec<Article>,
}

/// The selected, summarized articles for every non-empty category, in pool order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsletterDocument {
    pub sections: Vec<CategorySection>,
}

impl NewsletterDocument {
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.category.as_str())
    }

    #[cfg(test)]
    pub fn section(&self, category: &str) -> Option<&CategorySection> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }
}
