//! Newsletter outputs.
//!
//! # Submodules
//!
//! - [`text`]: plain-text newsletter, ready to paste into an email body
//! - [`html`]: standalone styled HTML page
//! - [`json`]: the [`NewsletterDocument`] as JSON
//! - [`email`]: the text and HTML renditions mailed as one message
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── newsletter.txt
//! ├── newsletter.html
//! └── newsletter_2025-05-06.json
//! ```

pub mod email;
pub mod html;
pub mod json;
pub mod text;

use crate::models::NewsletterDocument;
use chrono::NaiveDate;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const TEXT_FILENAME: &str = "newsletter.txt";
pub const HTML_FILENAME: &str = "newsletter.html";

/// Display headings for the well-known categories.
const CATEGORY_TITLES: &[(&str, &str)] = &[
    ("politics", "POLITICS"),
    ("economics", "ECONOMICS & BUSINESS"),
    ("technology", "TECHNOLOGY"),
    ("science", "SCIENCE"),
    ("health", "HEALTH"),
    ("sports", "SPORTS"),
    ("entertainment", "ENTERTAINMENT"),
    ("crime", "CRIME & JUSTICE"),
    ("general", "GENERAL NEWS"),
];

/// Section heading for `category`; unknown categories are uppercased.
pub fn heading(category: &str) -> String {
    CATEGORY_TITLES
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| category.to_uppercase())
}

/// The newsletter date as shown to readers, e.g. `May 06, 2025`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Write the text, HTML and JSON renditions of `doc` into `output_dir`.
///
/// Returns the paths written, in that order.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), %date))]
pub async fn write_newsletter(
    doc: &NewsletterDocument,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let text_path = output_dir.join(TEXT_FILENAME);
    fs::write(&text_path, text::render_text(doc, date)).await?;
    info!(path = %text_path.display(), "Wrote plain-text newsletter");

    let html_path = output_dir.join(HTML_FILENAME);
    fs::write(&html_path, html::render_html(doc, date)).await?;
    info!(path = %html_path.display(), "Wrote HTML newsletter");

    let json_path = json::write_document(doc, output_dir, date).await?;

    Ok(vec![text_path, html_path, json_path])
}
