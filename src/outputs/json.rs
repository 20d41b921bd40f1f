//! JSON dump of the finished newsletter.
//!
//! The file is written to `{output_dir}/newsletter_{YYYY-MM-DD}.json` so
//! that runs on different days do not overwrite each other.

use crate::models::NewsletterDocument;
use chrono::NaiveDate;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the JSON dump for `date`.
pub fn document_filename(date: NaiveDate) -> String {
    format!("newsletter_{}.json", date.format("%Y-%m-%d"))
}

/// Serialize `doc` into the output directory, creating it if needed.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_document(
    doc: &NewsletterDocument,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(doc)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = output_dir.join(document_filename(date));
    fs::write(&path, json).await?;
    info!(path = %path.display(), sections = doc.sections.len(), "Wrote JSON document");

    Ok(path)
}
