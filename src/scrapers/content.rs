//! Article page fetcher and paragraph text extraction.
//!
//! Pages are fetched with a browser-like `User-Agent` and a hard timeout.
//! Paragraphs inside `script`, `style`, `nav`, `header`, `footer` and
//! `aside` elements are ignored. The remaining `<p>` texts are joined with
//! single spaces.

use crate::config::FetchConfig;
use crate::error::ConfigError;
use crate::utils::truncate_chars;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Elements whose text never counts as article content.
const NON_CONTENT: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Fetch the readable text of a page. Returns an empty string on any failure.
pub trait ContentFetcher {
    async fn fetch(&self, url: &str) -> String;
}

/// [`ContentFetcher`] over HTTP GET, without retries.
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    client: Client,
    max_chars: usize,
}

impl HttpContentFetcher {
    pub fn from_config(config: &FetchConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            max_chars: config.max_chars,
        })
    }

    /// The underlying client, configured with the fetch timeout and user agent.
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn fetch_body(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl ContentFetcher for HttpContentFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> String {
        match self.fetch_body(url).await {
            Ok(body) => {
                let text = extract_text(&body, self.max_chars);
                if text.is_empty() {
                    warn!("Page had no extractable paragraph text");
                } else {
                    info!(chars = text.chars().count(), "Fetched article content");
                }
                text
            }
            Err(e) => {
                warn!(error = %e, "Article fetch failed; continuing without content");
                String::new()
            }
        }
    }
}

/// Extract paragraph text from an HTML document, truncated to `max_chars` characters.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let text = document
        .select(&PARAGRAPH)
        .filter(|p| !inside_non_content(p))
        .map(paragraph_text)
        .filter(|t| !t.is_empty())
        .join(" ");
    debug!(bytes = text.len(), "Extracted paragraph text");
    truncate_chars(&text, max_chars).to_string()
}

fn is_non_content(name: &str) -> bool {
    NON_CONTENT.contains(&name)
}

fn inside_non_content(p: &ElementRef<'_>) -> bool {
    p.ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|el| is_non_content(el.name()))
}

/// Text of one paragraph, skipping any script or style nested inside it.
fn paragraph_text(p: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in p.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != p.id())
            .filter_map(|a| a.value().as_element())
            .any(|el| is_non_content(el.name()));
        if !hidden {
            raw.push_str(text);
        }
    }
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}
