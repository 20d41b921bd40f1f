//! Per-category processing: select, then summarize each selected article.

use crate::api::Judge;
use crate::models::Article;
use crate::pipeline::PipelineOptions;
use crate::pipeline::selector::{SELECTION_SIZE, select_top};
use crate::pipeline::summarizer::summarize;
use crate::scrapers::ContentFetcher;
use futures::stream::{self, StreamExt};
use tokio::time::{Instant, timeout_at};
use tracing::{info, instrument, warn};

/// Select the category's top articles and return enriched copies of them.
///
/// The whole category shares one deadline, `options.category_timeout` from
/// the call. The input articles are only borrowed.
///
/// # Arguments
///
/// * `judge` - Answers the selection and summarization prompts
/// * `fetcher` - Supplies article text for grounded summaries
/// * `options` - Candidate bound, prompt size, summary concurrency and deadline
/// * `category` - Name of the category, shown to the selector
/// * `articles` - The category's candidates, in arrival order
///
/// # Returns
///
/// The selected articles in selection order, each a new record with
/// `summary` set. When the deadline passes during selection, the first two
/// candidates are returned without summaries. When it passes while
/// summarizing, the articles already selected are returned without summaries.
#[instrument(level = "info", skip_all, fields(%category, candidates = articles.len()))]
pub async fn process_category<J: Judge, F: ContentFetcher>(
    judge: &J,
    fetcher: &F,
    options: &PipelineOptions,
    category: &str,
    articles: &[Article],
) -> Vec<Article> {
    let deadline = Instant::now() + options.category_timeout;

    let selected = match timeout_at(
        deadline,
        select_top(judge, category, articles, options.max_candidates),
    )
    .await
    {
        Ok(selected) => selected,
        Err(_) => {
            warn!(timeout = ?options.category_timeout, "Selection timed out; using the first articles unsummarized");
            return articles.iter().take(SELECTION_SIZE).cloned().collect();
        }
    };

    let summaries = stream::iter(&selected)
        .map(|article| async move {
            let summary = summarize(
                judge,
                fetcher,
                &article.title,
                &article.link,
                None,
                options.prompt_content_chars,
            )
            .await;
            article.with_summary(summary)
        })
        .buffered(options.summary_concurrency.max(1))
        .collect::<Vec<Article>>();

    match timeout_at(deadline, summaries).await {
        Ok(enriched) => {
            info!(selected = enriched.len(), "Category processed");
            enriched
        }
        Err(_) => {
            warn!(timeout = ?options.category_timeout, "Summaries timed out; keeping unsummarized selections");
            selected.iter().map(|article| (*article).clone()).collect()
        }
    }
}
