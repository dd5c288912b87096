//! Fuzzy search tool handler.

use crate::search::{SearchOptions, Segment, excerpt, highlight, search, suggest};
use crate::types::{MatchResult, ResultKind};
use crate::worker::SearchState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Number of "did you mean" suggestions shown for an empty result.
const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Free-text query; typos are tolerated
    pub query: String,
    /// Maximum number of results, documents and sections combined (default from config)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Match strictness from 0.0 (exact) to 1.0 (anything); default from config
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Run a query against the current snapshot and format the ranked results.
pub fn handle_search(state: &SearchState, request: SearchRequest) -> Result<String, String> {
    let snapshot = state.snapshot();
    let defaults = state.config().search;
    let options = SearchOptions {
        threshold: request.threshold.unwrap_or(defaults.threshold),
        max_results: request.limit.unwrap_or(defaults.max_results),
        ..defaults
    };

    let results = search(
        &snapshot.artifact.entries,
        &snapshot.artifact.weights,
        &request.query,
        &options,
    )
    .map_err(|e| format!("Invalid search configuration: {}", e))?;

    if results.is_empty() {
        let mut output = format!("No results found for '{}'.", request.query.trim());
        let suggestions = suggest(&snapshot.artifact.entries, &request.query, SUGGESTION_LIMIT);
        if !suggestions.is_empty() {
            let names: Vec<_> = suggestions.iter().map(|s| s.text.as_str()).collect();
            let _ = write!(output, "\n\nDid you mean: {}?", names.join(", "));
        }
        return Ok(output);
    }

    Ok(format_results(&results))
}

/// Render results as Markdown, sections indented under their document.
pub fn format_results(results: &[MatchResult]) -> String {
    let term = results.first().map_or("", |r| r.search_term.as_str());
    let mut output = format!("Found {} results for '{}':\n", results.len(), term);

    for result in results {
        let indent = match result.kind {
            ResultKind::Document => "",
            ResultKind::Section => "  ",
        };
        let _ = write!(
            output,
            "\n{}- {} `{}` (score {:.3})",
            indent,
            emphasize(&highlight(&result.title, &result.search_term)),
            result.url,
            result.score
        );
        if let Some(update) = &result.last_update {
            let _ = write!(output, ", updated {}", update.date);
        }

        let first_term = result.search_term.split_whitespace().next().unwrap_or("");
        let preview = excerpt(&result.preview_content, first_term, 100);
        if !preview.is_empty() {
            let _ = write!(
                output,
                "\n{}  {}",
                indent,
                emphasize(&highlight(&preview, &result.search_term))
            );
        }
    }
    output
}

/// Join segments, wrapping matched ones in `**`.
pub fn emphasize(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.is_match {
                format!("**{}**", segment.text)
            } else {
                segment.text.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn result(kind: ResultKind, url: &str, title: &str, preview: &str) -> MatchResult {
        MatchResult {
            kind,
            score: 0.1,
            url: url.to_string(),
            title: title.to_string(),
            preview_content: preview.to_string(),
            parent_title: None,
            parent_url: None,
            last_update: None,
            search_term: "install".to_string(),
        }
    }

    #[test]
    fn test_format_indents_sections_and_bolds_terms() {
        let output = format_results(&[
            result(ResultKind::Document, "/install", "Install Guide", "How to install"),
            result(ResultKind::Section, "/install#steps", "Steps", "Run the installer"),
        ]);
        check!(output.starts_with("Found 2 results for 'install':"));
        check!(output.contains("- **Install** Guide `/install` (score 0.100)"));
        check!(output.contains("\n  - Steps `/install#steps`"));
        check!(output.contains("How to **install**"));
        check!(!output.contains("**installer**"));
    }
}
