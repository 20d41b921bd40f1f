//! Keyword-based topic classification for feed entries.

/// Keywords per category, in tie-break order.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "politics",
        &[
            "election", "president", "congress", "senate", "parliament", "minister",
            "government", "vote", "democrat", "republican", "policy", "legislation",
            "campaign", "political", "diplomat", "embassy", "treaty", "sanction",
        ],
    ),
    (
        "economics",
        &[
            "economy", "market", "stock", "trade", "inflation", "gdp", "bank",
            "finance", "investment", "recession", "unemployment", "interest rate",
            "federal reserve", "wall street", "currency", "bitcoin", "crypto",
        ],
    ),
    (
        "sports",
        &[
            "game", "match", "championship", "league", "score", "player", "team",
            "football", "soccer", "basketball", "baseball", "tennis", "golf",
            "olympics", "tournament", "coach", "athlete", "nfl", "nba", "mlb",
        ],
    ),
    (
        "crime",
        &[
            "crime", "murder", "arrest", "police", "court", "trial", "prison",
            "criminal", "robbery", "fraud", "shooting", "investigation", "suspect",
            "charged", "convicted", "sentence", "lawsuit", "attorney",
        ],
    ),
    (
        "technology",
        &[
            "tech", "software", "ai", "artificial intelligence", "startup", "app",
            "google", "apple", "microsoft", "amazon", "meta", "cybersecurity",
            "data", "algorithm", "machine learning", "robot", "innovation",
        ],
    ),
    (
        "health",
        &[
            "health", "medical", "hospital", "doctor", "disease", "vaccine",
            "treatment", "cancer", "virus", "pandemic", "drug", "fda", "clinical",
            "patient", "surgery", "mental health", "covid", "research",
        ],
    ),
    (
        "science",
        &[
            "science", "research", "study", "discovery", "space", "nasa", "climate",
            "environment", "physics", "biology", "chemistry", "experiment",
            "scientist", "laboratory", "planet", "species", "evolution",
        ],
    ),
    (
        "entertainment",
        &[
            "movie", "film", "music", "celebrity", "actor", "singer", "concert",
            "album", "box office", "streaming", "netflix", "hollywood", "award",
            "grammy", "oscar", "emmy", "show", "series", "tv",
        ],
    ),
];

/// Pick the category whose keywords occur most often in `title` and `summary`.
///
/// Keywords match as plain substrings of the lowercased text. Ties go to the
/// category listed first in [`CATEGORY_KEYWORDS`]; no hits at all falls back
/// to `default_category`.
pub fn categorize(title: &str, summary: &str, default_category: &str) -> String {
    let text = format!("{title} {summary}").to_lowercase();

    let mut best: Option<(&str, usize)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        let score = keywords.iter().filter(|k| text.contains(*k)).count();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((category, score));
        }
    }

    best.map(|(category, _)| category)
        .unwrap_or(default_category)
        .to_string()
}
