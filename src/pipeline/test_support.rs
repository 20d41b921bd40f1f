//! In-memory stand-ins for the judgment client and the content fetcher.

use crate::api::{Judge, Profile};
use crate::models::Article;
use crate::scrapers::ContentFetcher;
use std::collections::HashMap;
use std::sync::Mutex;

type Reply = Box<dyn Fn(Profile, &str) -> String>;

/// A [`Judge`] that answers from a closure and records every prompt.
pub struct StubJudge {
    reply: Reply,
    calls: Mutex<Vec<(Profile, String)>>,
}

impl StubJudge {
    pub fn new(reply: impl Fn(Profile, &str) -> String + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers selections with `response` and summaries with [`echo_summary`].
    pub fn selecting(response: &str) -> Self {
        let response = response.to_string();
        Self::new(move |profile, prompt| match profile {
            Profile::Selection => response.clone(),
            Profile::Summarization => echo_summary(prompt),
        })
    }

    /// Answers everything with an empty string.
    pub fn silent() -> Self {
        Self::new(|_, _| String::new())
    }

    pub fn prompts(&self, profile: Profile) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == profile)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }
}

impl Judge for StubJudge {
    async fn judge(&self, profile: Profile, prompt: &str) -> String {
        self.calls
            .lock()
            .unwrap()
            .push((profile, prompt.to_string()));
        (self.reply)(profile, prompt)
    }
}

/// `Summary of: <content>` for grounded prompts, `Likely summary: <first line>` otherwise.
pub fn echo_summary(prompt: &str) -> String {
    match prompt.split_once("Article Content:\n") {
        Some((_, rest)) => format!(
            "Summary of: {}",
            rest.split("\n\n").next().unwrap_or_default()
        ),
        None => format!(
            "Likely summary: {}",
            prompt.lines().next().unwrap_or_default()
        ),
    }
}

/// A [`ContentFetcher`] serving fixed pages; unknown URLs yield empty text.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pages<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ContentFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> String {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

/// An article whose link is derived from its title.
pub fn article(title: &str, category: &str) -> Article {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    Article::new(
        title,
        &format!("https://news.test/{slug}"),
        "Test Wire",
        category,
        None,
    )
}
