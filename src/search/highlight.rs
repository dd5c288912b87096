//! Whole-token highlighting and match excerpts for result previews.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// A run of preview text, marked when it is a highlighted query token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_match: false,
        }
    }
}

fn token_pattern(tokens: &[String]) -> Option<Regex> {
    let alternation = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Split `text` into segments, marking whole words equal to a query token.
///
/// Comparison ignores case, but a token only matches a complete word:
/// `start` does not mark the `Start` of `Started`.
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    tokens.dedup();
    let Some(pattern) = Some(&tokens)
        .filter(|tokens| !tokens.is_empty())
        .and_then(|tokens| token_pattern(tokens))
    else {
        return vec![Segment::plain(text)];
    };

    let is_word_char = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
    let mut segments = Vec::new();
    let mut last = 0;
    let mut cursor = 0;
    while let Some(found) = pattern.find_at(text, cursor) {
        let before = text[..found.start()].chars().next_back();
        let after = text[found.end()..].chars().next();
        let lowered = found.as_str().to_lowercase();
        if is_word_char(before) || is_word_char(after) || !tokens.contains(&lowered) {
            // Retry one character later so an overlapping whole word is still found
            cursor = found.start() + text[found.start()..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        if found.start() > last {
            segments.push(Segment::plain(&text[last..found.start()]));
        }
        segments.push(Segment {
            text: found.as_str().to_string(),
            is_match: true,
        });
        last = found.end();
        cursor = found.end();
    }
    if last < text.len() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

/// Default number of characters kept on each side of an excerpt match.
pub const EXCERPT_CONTEXT: usize = 100;

/// A window of `content` around the first case-insensitive occurrence of `term`.
///
/// Elided text on either side is marked with `...`. Without an occurrence the
/// first `2 * context` characters are returned.
pub fn excerpt(content: &str, term: &str, context: usize) -> String {
    let term = term.trim();
    if content.is_empty() || term.is_empty() {
        return String::new();
    }

    let found = RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
        .and_then(|pattern| pattern.find(content).map(|m| (m.start(), m.end())));
    let Some((match_start, match_end)) = found else {
        return content.chars().take(context * 2).collect();
    };

    let start = content[..match_start]
        .char_indices()
        .rev()
        .take(context)
        .last()
        .map_or(match_start, |(i, _)| i);
    let end = content[match_end..]
        .char_indices()
        .nth(context)
        .map_or(content.len(), |(i, _)| match_end + i);

    let mut window = String::with_capacity(end - start + 6);
    if start > 0 {
        window.push_str("...");
    }
    window.push_str(&content[start..end]);
    if end < content.len() {
        window.push_str("...");
    }
    window
}
