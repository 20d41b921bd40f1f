//! Standalone HTML newsletter.

use crate::models::NewsletterDocument;
use crate::outputs::{display_date, heading};
use crate::pipeline::summarizer::SUMMARY_UNAVAILABLE;
use chrono::NaiveDate;

const STYLE: &str = r#"        body {
            font-family: Georgia, serif;
            line-height: 1.6;
            color: #333;
            margin: 0 auto;
            max-width: 700px;
            padding: 20px;
        }
        .header {
            background: #2b6cb0;
            color: white;
            padding: 25px;
            text-align: center;
            border-radius: 8px;
            margin-bottom: 25px;
        }
        .category {
            background: white;
            border-radius: 8px;
            padding: 20px;
            margin-bottom: 25px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .article-title {
            font-weight: bold;
            font-size: 18px;
            margin-bottom: 6px;
        }
        .read-more {
            font-weight: bold;
            color: #2b6cb0;
            text-decoration: none;
        }"#;

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `doc` as a styled HTML page for `date`.
pub fn render_html(doc: &NewsletterDocument, date: NaiveDate) -> String {
    let today = display_date(date);
    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Daily News Digest - {today}</title>
    <style>
{STYLE}
    </style>
</head>
<body>
    <div class="header">
        <h1>Daily News Digest</h1>
        <div>{today}</div>
    </div>
"#
    );

    for section in doc.sections.iter().filter(|s| !s.articles.is_empty()) {
        html.push_str(&format!(
            "\n    <div class=\"category\">\n        <h2>{}</h2>\n",
            escape_html(&heading(&section.category))
        ));
        for article in &section.articles {
            let summary = escape_html(article.summary.as_deref().unwrap_or(SUMMARY_UNAVAILABLE))
                .replace('\n', "<br>");
            html.push_str(&format!(
                r#"
        <div class="article">
            <div class="article-title">{}</div>
            <div>{}</div>
            <a class="read-more" href="{}">Read full article</a>
        </div>
"#,
                escape_html(&article.title),
                summary,
                escape_html(&article.link)
            ));
        }
        html.push_str("    </div>\n");
    }

    html.push_str("\n</body>\n</html>\n");
    html
}
