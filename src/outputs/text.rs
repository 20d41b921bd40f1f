//! Plain-text newsletter.

use crate::models::NewsletterDocument;
use crate::outputs::{display_date, heading};
use crate::pipeline::summarizer::SUMMARY_UNAVAILABLE;
use chrono::NaiveDate;

const TAGLINE: &str = "A curated selection of noteworthy news from around the world.";

/// Render `doc` as the plain-text newsletter for `date`.
///
/// Sections without articles are skipped.
pub fn render_text(doc: &NewsletterDocument, date: NaiveDate) -> String {
    let mut out = format!(
        "\nDaily News Digest\n{}\n\n{TAGLINE}\n\n",
        display_date(date)
    );

    for section in doc.sections.iter().filter(|s| !s.articles.is_empty()) {
        out.push_str(&format!("\n{}\n\n", heading(&section.category)));
        for article in &section.articles {
            out.push_str(&format!(
                "{}\nSource: {}\n\n{}\n\nRead more: {}\n\n",
                article.title,
                article.source,
                article.summary.as_deref().unwrap_or(SUMMARY_UNAVAILABLE),
                article.link
            ));
        }
    }

    out.push_str("\nThank you for reading the Daily News Digest.\n");
    out.push_str("To unsubscribe, reply with \"UNSUBSCRIBE\".\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, CategorySection};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn test_render_text_layout() {
        let doc = NewsletterDocument {
            sections: vec![CategorySection {
                category: "technology".into(),
                articles: vec![
                    Article::new("Chip plant opens", "https://n.test/chip", "Tech Wire", "technology", None)
                        .with_summary("Line 1\nLine 2\nLine 3"),
                ],
            }],
        };

        let text = render_text(&doc, date());
        let expected = "\nDaily News Digest\nNovember 03, 2025\n\n\
            A curated selection of noteworthy news from around the world.\n\n\
            \nTECHNOLOGY\n\n\
            Chip plant opens\nSource: Tech Wire\n\nLine 1\nLine 2\nLine 3\n\n\
            Read more: https://n.test/chip\n\n\
            \nThank you for reading the Daily News Digest.\n\
            To unsubscribe, reply with \"UNSUBSCRIBE\".\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_missing_summary_and_empty_sections() {
        let doc = NewsletterDocument {
            sections: vec![
                CategorySection {
                    category: "science".into(),
                    articles: vec![],
                },
                CategorySection {
                    category: "weather".into(),
                    articles: vec![Article::new("Storm nears", "https://n.test/s", "Wx", "weather", None)],
                },
            ],
        };

        let text = render_text(&doc, date());
        assert!(!text.contains("SCIENCE"));
        assert!(text.contains("\nWEATHER\n"));
        assert!(text.contains(&format!("\n\n{SUMMARY_UNAVAILABLE}\n\n")));
    }
}
