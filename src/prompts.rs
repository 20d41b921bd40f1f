//! System instructions and user prompt builders for the two judgment profiles.

use crate::utils::truncate_chars;
use itertools::Itertools;

pub const SELECTOR_INSTRUCTION: &str = r#"You are an expert news editor. Analyze news article titles and select the TWO most important and newsworthy articles.

Return exactly two titles formatted as:
SELECTED:
1. [title]
2. [title]"#;

pub const SUMMARIZER_INSTRUCTION: &str = r#"You are a skilled journalist. Summarize the article in exactly three lines:
1. Main event
2. Key context or details
3. Why it matters"#;

/// Ask the selector to pick two of `titles` for `category`.
pub fn selection_prompt<'a>(category: &str, titles: impl IntoIterator<Item = &'a str>) -> String {
    let titles_text = titles.into_iter().map(|t| format!("- {t}")).join("\n");
    format!(
        "Category: {}\n\nHere are the article titles:\n{}\n\nSelect the two strongest choices.",
        category.to_uppercase(),
        titles_text
    )
}

/// Summary prompt grounded in the first `max_chars` characters of `content`.
pub fn content_summary_prompt(title: &str, link: &str, content: &str, max_chars: usize) -> String {
    format!(
        "Article Title: {title}\nArticle URL: {link}\n\nArticle Content:\n{}\n\nProvide a 3-line summary.",
        truncate_chars(content, max_chars)
    )
}

/// Summary prompt used when no article text could be obtained.
pub fn title_only_summary_prompt(title: &str, link: &str) -> String {
    format!(
        "Article Title: {title}\nArticle URL: {link}\n\nProvide a likely 3-line summary based on the title."
    )
}
