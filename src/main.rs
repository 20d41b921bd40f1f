//! # Daily Digest
//!
//! A newsletter pipeline that polls news feeds, asks an LLM to pick the two
//! most newsworthy articles in each category, summarizes each pick in three
//! lines, and writes plain-text, HTML and JSON renditions of the result.
//!
//! ## Usage
//!
//! ```sh
//! GOOGLE_API_KEY=... daily_digest -o ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Ingestion**: poll the configured feeds (or read `--input`) and group
//!    articles by category
//! 2. **Selection**: one judgment call per category picks two titles
//! 3. **Summarization**: fetch each pick's page and summarize it
//! 4. **Output**: render the newsletter into the output directory, and mail
//!    it when `--send` is given

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod scrapers;
mod utils;

use api::JudgmentClient;
use cli::Cli;
use config::Config;
use models::CategoryPool;
use outputs::email::{self, EmailSettings};
use pipeline::{Pipeline, PipelineOptions};
use scrapers::HttpContentFetcher;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("daily_digest starting up");

    let args = Cli::parse();
    debug!(output_dir = %args.output_dir.display(), input = ?args.input, categories = ?args.categories, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(key) = args.api_key.clone() {
        config.backend.api_key = Some(key);
    }
    if let Some(sender) = args.sender_email.clone() {
        config.email.sender_email = Some(sender);
    }
    if let Some(password) = args.sender_password.clone() {
        config.email.sender_password = Some(password);
    }
    if !args.recipients.is_empty() {
        config.email.recipients = args.recipients.clone();
    }

    let judge = match JudgmentClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Invalid configuration; aborting before any processing");
            return Err(e.into());
        }
    };
    if let Err(e) = judge.verify_credential().await {
        error!(error = %e, "Credential check failed; aborting before ingestion");
        return Err(e.into());
    }
    let fetcher = HttpContentFetcher::from_config(&config.fetch)?;

    let delivery = if args.send {
        match EmailSettings::from_config(&config.email) {
            Ok(settings) => Some(settings),
            Err(e) => {
                error!(error = %e, "Invalid email settings; aborting before any processing");
                return Err(e.into());
            }
        }
    } else {
        None
    };

    // Early check: the output dir must be writable before spending model calls
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Ingestion ----
    let articles = match args.input.as_deref() {
        Some(path) => feeds::load_article_file(path).await?,
        None => feeds::fetch_all(fetcher.client(), &config.feeds).await,
    };

    let mut pools = CategoryPool::from_articles(articles);
    if !args.categories.is_empty() {
        pools.retain_categories(&args.categories);
        info!(categories = ?args.categories, remaining = pools.len(), "Applied category filter");
    }
    if pools.article_count() == 0 {
        info!("No articles were found. Exiting.");
        return Ok(());
    }
    info!(
        categories = pools.len(),
        articles = pools.article_count(),
        "Starting newsletter generation"
    );

    // ---- Select & summarize ----
    let pipeline = Pipeline::new(
        judge,
        fetcher,
        PipelineOptions::from_config(&config.pipeline),
    );
    let document = pipeline.run(&pools).await;
    info!(sections = ?document.categories().collect::<Vec<_>>(), "Newsletter assembled");

    // ---- Outputs ----
    let today = Local::now().date_naive();
    match outputs::write_newsletter(&document, &args.output_dir, today).await {
        Ok(paths) => info!(files = ?paths, "Newsletter generation complete"),
        Err(e) => {
            error!(error = %e, "Failed to write newsletter files");
            return Err(e);
        }
    }

    if let Some(settings) = &delivery {
        if let Err(e) = email::send_newsletter(settings, &document, today).await {
            error!(error = %e, "Newsletter was written but could not be mailed");
            return Err(e.into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
