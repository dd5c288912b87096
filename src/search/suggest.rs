//! "Did you mean" suggestions for queries that found nothing.

use crate::types::DocumentEntry;
use ahash::AHashSet;
use rapidfuzz::distance::jaro_winkler;

/// Suggestions below this similarity are not worth showing.
const MIN_SIMILARITY: f64 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
}

/// Titles and keywords most similar to `query`, best first.
pub fn suggest(entries: &[DocumentEntry], query: &str, limit: usize) -> Vec<Suggestion> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut seen = AHashSet::new();
    let mut suggestions: Vec<Suggestion> = entries
        .iter()
        .flat_map(|entry| std::iter::once(&entry.title).chain(&entry.keywords))
        .filter(|candidate| seen.insert(candidate.to_lowercase()))
        .map(|candidate| Suggestion {
            score: jaro_winkler::similarity(query.chars(), candidate.to_lowercase().chars()),
            text: candidate.clone(),
        })
        .filter(|suggestion| suggestion.score >= MIN_SIMILARITY)
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(limit);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn entry(title: &str, keywords: &[&str]) -> DocumentEntry {
        DocumentEntry {
            id: title.to_lowercase(),
            title: title.to_string(),
            description: String::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            last_update: None,
            url: format!("/{}", title.to_lowercase()),
            content_preview: String::new(),
            sections: vec![],
        }
    }

    #[test]
    fn test_suggests_closest_title() {
        let corpus = vec![entry("Configuration", &["config"]), entry("Deployment", &[])];
        let suggestions = suggest(&corpus, "configuraton", 3);
        check!(suggestions.first().map(|s| s.text.as_str()) == Some("Configuration"));
        check!(suggestions.iter().all(|s| s.text != "Deployment"));
    }

    #[test]
    fn test_deduplicates_candidates() {
        let corpus = vec![entry("Setup", &["setup"]), entry("Other", &["Setup"])];
        let suggestions = suggest(&corpus, "setup", 5);
        check!(suggestions.len() == 1);
    }

    #[test]
    fn test_blank_query() {
        check!(suggest(&[entry("Setup", &[])], "  ", 5).is_empty());
    }
}
