//! Three-line article summaries.

use crate::api::{Judge, Profile};
use crate::prompts::{content_summary_prompt, title_only_summary_prompt};
use crate::scrapers::ContentFetcher;
use tracing::{debug, instrument, warn};

/// Shown instead of a summary when the model produced none.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

/// Summarize one article, never returning an empty string.
///
/// When `content` is missing or empty the page is fetched. If there is still
/// no text, the model is asked for a likely summary from the title and link
/// alone.
///
/// # Arguments
///
/// * `judge` - Answers the summarization prompt
/// * `fetcher` - Used only when `content` is missing or empty
/// * `title` - Article headline
/// * `link` - Article URL, fetched and quoted in the prompt
/// * `content` - Article text supplied by the caller, if any
/// * `content_chars` - Characters of text included in the prompt
///
/// # Returns
///
/// The trimmed model reply, or [`SUMMARY_UNAVAILABLE`] when it was empty.
#[instrument(level = "info", skip_all, fields(%link))]
pub async fn summarize<J: Judge, F: ContentFetcher>(
    judge: &J,
    fetcher: &F,
    title: &str,
    link: &str,
    content: Option<&str>,
    content_chars: usize,
) -> String {
    let fetched;
    let content = match content {
        Some(text) if !text.is_empty() => text,
        _ => {
            fetched = fetcher.fetch(link).await;
            fetched.as_str()
        }
    };

    let prompt = if content.is_empty() {
        debug!("No article text; summarizing from the title");
        title_only_summary_prompt(title, link)
    } else {
        content_summary_prompt(title, link, content, content_chars)
    };

    let summary = judge.judge(Profile::Summarization, &prompt).await;
    let summary = summary.trim();
    if summary.is_empty() {
        warn!("Summarizer returned nothing; using placeholder");
        SUMMARY_UNAVAILABLE.to_string()
    } else {
        summary.to_string()
    }
}
