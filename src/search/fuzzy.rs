//! Query normalization and approximate term distance.

/// A normalized query: trimmed, lower-cased, split on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    normalized: String,
    terms: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let terms: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
        Self {
            normalized: terms.join(" "),
            terms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The normalized query text, terms joined by single spaces.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }
}

/// Distance between a term and its closest substring of `text`, in `[0, 1]`.
///
/// Both inputs are expected lower-cased. A substring hit is `0.0`; otherwise
/// the semi-global edit distance (free prefix and suffix in `text`) is divided
/// by the term length and capped at `1.0`.
pub fn term_distance(term: &str, text: &str) -> f64 {
    if term.is_empty() {
        return 1.0;
    }
    if text.contains(term) {
        return 0.0;
    }

    let pattern: Vec<char> = term.chars().collect();
    let m = pattern.len();
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut cur = vec![0; m + 1];
    let mut best = m;

    for tc in text.chars() {
        cur[0] = 0;
        for i in 1..=m {
            let substitution = prev[i - 1] + usize::from(pattern[i - 1] != tc);
            cur[i] = substitution.min(prev[i] + 1).min(cur[i - 1] + 1);
        }
        best = best.min(cur[m]);
        std::mem::swap(&mut prev, &mut cur);
    }

    (best as f64 / m as f64).min(1.0)
}

/// Raw score of one field value against every query term, or `None` if no
/// term is within `threshold`.
///
/// Matched terms contribute their distance and unmatched terms contribute
/// `threshold`; the result is the mean over all terms. Terms shorter than
/// `min_chars` never match.
pub fn score_text(terms: &[String], text_lower: &str, threshold: f64, min_chars: usize) -> Option<f64> {
    if terms.is_empty() || text_lower.is_empty() {
        return None;
    }

    let mut any_matched = false;
    let total: f64 = terms
        .iter()
        .map(|term| {
            if term.chars().count() < min_chars {
                return threshold;
            }
            let distance = term_distance(term, text_lower);
            if distance <= threshold {
                any_matched = true;
                distance
            } else {
                threshold
            }
        })
        .sum();

    any_matched.then(|| total / terms.len() as f64)
}
