//! Narrow a category's candidates to the two most newsworthy articles.
//!
//! The model answers in free text, so its reply is bound back to the input
//! records with [`match_titles`], a pure function over titles and response
//! lines. Anything other than exactly two matches falls back to the first
//! two articles of the pool.

use crate::api::{Judge, Profile};
use crate::models::Article;
use crate::prompts::selection_prompt;
use crate::utils::truncate_for_log;
use tracing::{debug, info, instrument, warn};

/// Articles kept per category.
pub const SELECTION_SIZE: usize = 2;

/// Response lines this short (in characters) are noise, e.g. `1.` or `---`.
const MIN_LINE_CHARS: usize = 5;

/// Indices of `titles` that the model's `response` refers to, in title order.
///
/// Lines of at most five characters are dropped. A title matches when, both
/// lowercased, the title contains a line or a line contains the title. The
/// scan stops once `limit` titles have matched.
pub fn match_titles<S: AsRef<str>>(titles: &[S], response: &str, limit: usize) -> Vec<usize> {
    let lines: Vec<String> = response
        .lines()
        .filter(|line| line.chars().count() > MIN_LINE_CHARS)
        .map(str::to_lowercase)
        .collect();

    let mut matched = Vec::with_capacity(limit);
    for (idx, title) in titles.iter().enumerate() {
        if matched.len() == limit {
            break;
        }
        let title = title.as_ref().to_lowercase();
        if lines
            .iter()
            .any(|line| title.contains(line.as_str()) || line.contains(title.as_str()))
        {
            matched.push(idx);
        }
    }
    matched
}

/// Pick at most [`SELECTION_SIZE`] articles from `articles`.
///
/// Pools of two or fewer are returned as-is without a judgment call. Only the
/// first `max_candidates` titles are shown to the model, but the reply is
/// matched against the whole pool.
///
/// # Arguments
///
/// * `judge` - Answers the selection prompt
/// * `category` - Category name, uppercased in the prompt
/// * `articles` - The category's candidates, in arrival order
/// * `max_candidates` - How many titles the prompt lists
///
/// # Returns
///
/// References into `articles`, never new records. Exactly two when the reply
/// names two titles, otherwise the first two of the pool.
#[instrument(level = "info", skip_all, fields(%category, candidates = articles.len()))]
pub async fn select_top<'a, J: Judge>(
    judge: &J,
    category: &str,
    articles: &'a [Article],
    max_candidates: usize,
) -> Vec<&'a Article> {
    if articles.len() <= SELECTION_SIZE {
        debug!("Pool already small enough; skipping selection call");
        return articles.iter().collect();
    }

    let prompt = selection_prompt(
        category,
        articles
            .iter()
            .take(max_candidates)
            .map(|a| a.title.as_str()),
    );
    let response = judge.judge(Profile::Selection, &prompt).await;
    if response.is_empty() {
        warn!("Selection returned nothing; using the first articles");
        return first_articles(articles);
    }

    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    let matched = match_titles(&titles, &response, SELECTION_SIZE);
    if matched.len() == SELECTION_SIZE {
        info!(?matched, "Selected articles");
        matched.into_iter().map(|idx| &articles[idx]).collect()
    } else {
        warn!(
            matched = matched.len(),
            response_preview = %truncate_for_log(&response, 200),
            "Selection response did not name two articles; using the first articles"
        );
        first_articles(articles)
    }
}

fn first_articles(articles: &[Article]) -> Vec<&Article> {
    articles.iter().take(SELECTION_SIZE).collect()
}
