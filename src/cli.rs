//! Command-line interface definitions for Daily Digest.
//!
//! The credential may also be supplied through `GOOGLE_API_KEY`, and the mail
//! sender through `SENDER_EMAIL` / `SENDER_PASSWORD`. Values given here win
//! over the config file.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Daily Digest application.
///
/// # Examples
///
/// ```sh
/// # Poll the built-in feeds and write into ./out
/// daily_digest -o ./out
///
/// # Use a prepared article file and only two categories
/// daily_digest -i articles.json --category politics --category technology
///
/// # Mail the result as well
/// SENDER_EMAIL=me@example.com SENDER_PASSWORD=... daily_digest --send --recipient you@example.com
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the newsletter files are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// JSON file of articles to use instead of polling feeds
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Only process these categories (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// API key for the generation backend
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Email the newsletter after writing it
    #[arg(long)]
    pub send: bool,

    /// Newsletter recipient (repeatable; replaces email.recipients)
    #[arg(long = "recipient")]
    pub recipients: Vec<String>,

    /// Sender address used for SMTP login
    #[arg(long, env = "SENDER_EMAIL")]
    pub sender_email: Option<String>,

    /// Sender password or app password
    #[arg(long, env = "SENDER_PASSWORD", hide_env_values = true)]
    pub sender_password: Option<String>,
}
