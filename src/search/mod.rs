//! Fuzzy query engine over an indexed corpus.
//!
//! A query is normalized into terms, every configured field of every entry is
//! scored against those terms ([`matcher`]), and the flat matches are grouped
//! into a document → section ranking ([`aggregate`]). Highlighting of preview
//! text is a separate, purely presentational step ([`highlight`]).

pub mod aggregate;
pub mod fuzzy;
pub mod highlight;
pub mod matcher;
pub mod suggest;
pub mod weights;

pub use aggregate::aggregate;
pub use fuzzy::Query;
pub use highlight::{Segment, excerpt, highlight};
pub use matcher::{FieldMatch, MatchOptions, match_corpus};
pub use suggest::{Suggestion, suggest};
pub use weights::{FieldPath, FieldWeights};

use crate::error::QueryError;
use crate::types::{DocumentEntry, MatchResult};
use serde::{Deserialize, Serialize};

/// Query-time knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchOptions {
    /// Maximum accepted distance, in `[0, 1]`.
    pub threshold: f64,
    pub max_results: usize,
    pub min_match_char_length: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            max_results: 10,
            min_match_char_length: 2,
        }
    }
}

impl SearchOptions {
    fn validate(&self) -> Result<(), QueryError> {
        if self.threshold.is_finite() && (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(QueryError::InvalidThreshold(self.threshold))
        }
    }
}

/// Run a query against `entries` and return ranked, deduplicated results.
///
/// Configuration errors reject the whole call, even for an empty query. An
/// empty or whitespace-only query is not an error and yields no results.
pub fn search(
    entries: &[DocumentEntry],
    weights: &FieldWeights,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<MatchResult>, QueryError> {
    options.validate()?;
    let fields = weights.resolve()?;

    let query = Query::parse(query);
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let matches = match_corpus(
        entries,
        &query,
        &fields,
        MatchOptions {
            threshold: options.threshold,
            min_match_char_length: options.min_match_char_length,
        },
    );
    tracing::debug!(
        "Query '{}' matched {} field locations",
        query.as_str(),
        matches.len()
    );

    Ok(aggregate(&matches, options.max_results, query.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResultKind, Section, section_url};
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn corpus() -> Vec<DocumentEntry> {
        vec![
            DocumentEntry {
                id: "install".to_string(),
                title: "Install Guide".to_string(),
                description: "Set up the toolchain".to_string(),
                keywords: vec!["setup".to_string()],
                last_update: None,
                url: "/install".to_string(),
                content_preview: "Install the toolchain first.".to_string(),
                sections: vec![Section {
                    id: "prerequisites".to_string(),
                    heading: "Prerequisites".to_string(),
                    level: 2,
                    content: "You need a recent compiler.".to_string(),
                    url: section_url("/install", "prerequisites"),
                }],
            },
            DocumentEntry {
                id: "usage".to_string(),
                title: "Usage".to_string(),
                description: String::new(),
                keywords: vec![],
                last_update: None,
                url: "/usage".to_string(),
                content_preview: "Run the binary.".to_string(),
                sections: vec![],
            },
        ]
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_query_is_empty(#[case] query: &str) {
        let_assert!(Ok(results) = search(&corpus(), &FieldWeights::default(), query, &SearchOptions::default()));
        check!(results.is_empty());
    }

    #[test]
    fn test_section_hit_follows_placeholder_document() {
        let_assert!(
            Ok(results) = search(&corpus(), &FieldWeights::default(), "prerequisites", &SearchOptions::default())
        );
        let_assert!([doc, section] = results.as_slice());
        check!(doc.kind == ResultKind::Document);
        check!(doc.url == "/install");
        check!(section.url == "/install#prerequisites");
        check!(section.parent_title.as_deref() == Some("Install Guide"));
        check!(section.search_term == "prerequisites");
    }

    #[test]
    fn test_search_term_is_normalized() {
        let results = search(&corpus(), &FieldWeights::default(), "  USAGE ", &SearchOptions::default()).unwrap();
        check!(results[0].url == "/usage");
        check!(results[0].search_term == "usage");
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let weights = FieldWeights::from_pairs([("body", 1.0)]);
        check!(
            search(&corpus(), &weights, "", &SearchOptions::default())
                == Err(QueryError::UnknownField("body".to_string()))
        );

        let options = SearchOptions {
            threshold: 1.5,
            ..SearchOptions::default()
        };
        check!(
            search(&corpus(), &FieldWeights::default(), "x", &options)
                == Err(QueryError::InvalidThreshold(1.5))
        );
    }

    #[test]
    fn test_no_duplicate_results() {
        let results = search(&corpus(), &FieldWeights::default(), "install toolchain", &SearchOptions::default()).unwrap();
        let mut keys: Vec<_> = results.iter().map(|r| (r.kind, r.url.clone())).collect();
        let before = keys.len();
        keys.sort_by(|a, b| a.1.cmp(&b.1));
        keys.dedup();
        check!(keys.len() == before);
    }
}
