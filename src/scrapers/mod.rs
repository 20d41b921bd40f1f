//! Best-effort retrieval of article body text.
//!
//! The pipeline only needs one thing from a news page: its paragraph text,
//! bounded in length. [`content`] fetches a page and extracts that text,
//! never failing the caller: any network error, non-2xx status or page
//! without paragraphs yields an empty string.

pub mod content;

pub use content::{ContentFetcher, HttpContentFetcher};
