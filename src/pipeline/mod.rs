//! The selection-and-summarization pipeline.
//!
//! For every non-empty category of a [`CategoryPool`]:
//! 1. **Select**: [`selector::select_top`] narrows the pool to two articles
//! 2. **Summarize**: [`summarizer::summarize`] writes a three-line summary per article
//! 3. **Assemble**: [`category::process_category`] returns enriched copies, and
//!    [`Pipeline::run`] collects them into a [`NewsletterDocument`]
//!
//! Categories share nothing, so they run concurrently behind a bounded
//! stream. Each one also runs under its own deadline so that a stuck
//! category cannot hold up the run.

pub mod category;
pub mod selector;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod test_support;

use crate::api::Judge;
use crate::config::PipelineConfig;
use crate::models::{CategoryPool, CategorySection, NewsletterDocument};
use crate::scrapers::ContentFetcher;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Tuning knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_candidates: usize,
    pub prompt_content_chars: usize,
    pub category_concurrency: usize,
    pub summary_concurrency: usize,
    pub category_timeout: Duration,
}

impl PipelineOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            prompt_content_chars: config.prompt_content_chars,
            category_concurrency: config.category_concurrency,
            summary_concurrency: config.summary_concurrency,
            category_timeout: Duration::from_secs(config.category_timeout_secs),
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Drives the pipeline over every category with a judge and a fetcher.
pub struct Pipeline<J, F> {
    judge: J,
    fetcher: F,
    options: PipelineOptions,
}

impl<J: Judge, F: ContentFetcher> Pipeline<J, F> {
    pub fn new(judge: J, fetcher: F, options: PipelineOptions) -> Self {
        Self {
            judge,
            fetcher,
            options,
        }
    }

    /// Process every category and assemble the newsletter.
    ///
    /// # Arguments
    ///
    /// * `pools` - Candidate articles grouped by category
    ///
    /// # Returns
    ///
    /// A [`NewsletterDocument`] with one section per non-empty category, in
    /// pool order whatever order the categories finish in. At most
    /// `category_concurrency` categories are in flight. Each one runs under
    /// its own deadline (see [`category::process_category`]), so a stuck
    /// category degrades without holding up the others.
    #[instrument(level = "info", skip_all, fields(categories = pools.len(), articles = pools.article_count()))]
    pub async fn run(&self, pools: &CategoryPool) -> NewsletterDocument {
        let t0 = Instant::now();
        let sections: Vec<CategorySection> = stream::iter(
            pools.iter().filter(|(_, articles)| !articles.is_empty()),
        )
        .map(|(category, articles)| async move {
            CategorySection {
                category: category.to_string(),
                articles: category::process_category(
                    &self.judge,
                    &self.fetcher,
                    &self.options,
                    category,
                    articles,
                )
                .await,
            }
        })
        .buffered(self.options.category_concurrency.max(1))
        .collect()
        .await;

        let document = NewsletterDocument { sections };
        info!(
            sections = document.sections.len(),
            articles = document.article_count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Profile;
    use crate::models::Article;
    use crate::pipeline::summarizer::SUMMARY_UNAVAILABLE;
    use crate::pipeline::test_support::{StubFetcher, StubJudge, article};

    /// Never answers the selection call for one category.
    struct StallingJudge {
        inner: StubJudge,
        stalled_category: &'static str,
    }

    impl Judge for StallingJudge {
        async fn judge(&self, profile: Profile, prompt: &str) -> String {
            let marker = format!("Category: {}\n", self.stalled_category.to_uppercase());
            if prompt.starts_with(&marker) {
                std::future::pending::<()>().await;
            }
            self.inner.judge(profile, prompt).await
        }
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_selected_articles_are_summarized_from_their_content() {
        let tech: Vec<Article> = [
            "Alpha chip maker expands",
            "Bravo app store rules change",
            "Charlie robot passes exam",
            "Delta cloud outage ends",
            "Echo phone sales slump",
        ]
        .iter()
        .map(|t| article(t, "tech"))
        .collect();
        let fetcher = StubFetcher::with_pages([
            (tech[0].link.as_str(), "Alpha is building two new fabs."),
            (tech[2].link.as_str(), "Charlie's robot passed a bar exam."),
        ]);
        let judge = StubJudge::selecting(
            "SELECTED:\n1. Alpha chip maker expands\n2. Charlie robot passes exam",
        );

        let mut pools = CategoryPool::new();
        pools.insert("tech", tech.clone());
        let pipeline = Pipeline::new(judge, fetcher, PipelineOptions::default());
        let doc = pipeline.run(&pools).await;

        assert_eq!(doc.categories().collect::<Vec<_>>(), vec!["tech"]);
        let out = &doc.section("tech").unwrap().articles;
        assert_eq!(titles(out), vec!["Alpha chip maker expands", "Charlie robot passes exam"]);
        assert!(out[0].same_article(&tech[0]));
        assert!(out[1].same_article(&tech[2]));
        assert_eq!(
            out[0].summary.as_deref(),
            Some("Summary of: Alpha is building two new fabs.")
        );
        assert_eq!(
            out[1].summary.as_deref(),
            Some("Summary of: Charlie's robot passed a bar exam.")
        );
    }

    #[tokio::test]
    async fn test_small_category_skips_selection_and_keeps_order() {
        let sports = vec![article("X takes the title", "sports"), article("Y retires", "sports")];
        let mut pools = CategoryPool::new();
        pools.insert("sports", sports);

        let pipeline = Pipeline::new(
            StubJudge::selecting("unused"),
            StubFetcher::empty(),
            PipelineOptions::default(),
        );
        let doc = pipeline.run(&pools).await;

        assert!(pipeline.judge.prompts(Profile::Selection).is_empty());
        assert_eq!(pipeline.judge.prompts(Profile::Summarization).len(), 2);
        let out = &doc.section("sports").unwrap().articles;
        assert_eq!(titles(out), vec!["X takes the title", "Y retires"]);
        assert!(out.iter().all(|a| a.summary.as_deref().is_some_and(|s| !s.is_empty())));
    }

    #[tokio::test]
    async fn test_failed_fetch_still_produces_a_summary() {
        let z = article("Z factory closes", "economics");
        let mut pools = CategoryPool::new();
        pools.insert("economics", vec![z.clone()]);

        let pipeline = Pipeline::new(
            StubJudge::selecting(""),
            StubFetcher::empty(),
            PipelineOptions::default(),
        );
        let doc = pipeline.run(&pools).await;

        let prompts = pipeline.judge.prompts(Profile::Summarization);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("based on the title"));
        let summary = doc.section("economics").unwrap().articles[0].summary.clone().unwrap();
        assert_eq!(summary, "Likely summary: Article Title: Z factory closes");
    }

    #[tokio::test]
    async fn test_empty_categories_are_omitted_and_order_is_kept() {
        let mut pools = CategoryPool::new();
        pools.insert("politics", vec![article("Vote count finishes", "politics")]);
        pools.insert("science", Vec::new());
        pools.insert("health", vec![article("Clinic opens downtown", "health")]);
        pools.insert("general", vec![article("Parade draws crowds", "general")]);

        let options = PipelineOptions {
            category_concurrency: 3,
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::new(StubJudge::silent(), StubFetcher::empty(), options);
        let doc = pipeline.run(&pools).await;

        assert_eq!(
            doc.categories().collect::<Vec<_>>(),
            vec!["politics", "health", "general"]
        );
        assert!(doc.sections.iter().flat_map(|s| &s.articles).all(|a| a.summary.as_deref() == Some(SUMMARY_UNAVAILABLE)));
    }

    #[tokio::test]
    async fn test_stuck_category_degrades_without_blocking_others() {
        let slow: Vec<Article> = ["S one", "S two", "S three"]
            .iter()
            .map(|t| article(&format!("{t} headline"), "slow"))
            .collect();
        let mut pools = CategoryPool::new();
        pools.insert("slow", slow);
        pools.insert("fast", vec![article("Fast lane headline", "fast")]);

        let judge = StallingJudge {
            inner: StubJudge::selecting(""),
            stalled_category: "slow",
        };
        let options = PipelineOptions {
            category_timeout: Duration::from_millis(50),
            ..PipelineOptions::default()
        };
        let doc = Pipeline::new(judge, StubFetcher::empty(), options).run(&pools).await;

        let slow_out = &doc.section("slow").unwrap().articles;
        assert_eq!(titles(slow_out), vec!["S one headline", "S two headline"]);
        assert!(slow_out.iter().all(|a| a.summary.is_none()));

        let fast_out = &doc.section("fast").unwrap().articles;
        assert!(fast_out[0].summary.is_some());
    }
}
