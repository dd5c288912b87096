//! Weighted field matching over a corpus.

use crate::search::FieldPath;
use crate::search::fuzzy::{Query, score_text};
use crate::types::{DocumentEntry, Section};

/// One scored match location: a document field, or a field of one section.
#[derive(Debug, Clone, Copy)]
pub struct FieldMatch<'a> {
    pub entry: &'a DocumentEntry,
    pub field: FieldPath,
    pub section: Option<&'a Section>,
    /// Weighted distance in `[0, 1]`, lower is better.
    pub score: f64,
}

/// Thresholds applied while matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub threshold: f64,
    pub min_match_char_length: usize,
}

/// Score every configured field of every entry against `query`.
///
/// Returns matches ascending by score. Ties keep corpus order, then field order.
/// An entry contributes nothing when its best score is above the threshold.
pub fn match_corpus<'a>(
    entries: &'a [DocumentEntry],
    query: &Query,
    fields: &[(FieldPath, f64)],
    options: MatchOptions,
) -> Vec<FieldMatch<'a>> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut scratch = Vec::new();

    for entry in entries {
        scratch.clear();
        for &(field, weight) in fields {
            match_field(entry, field, weight, query, options, &mut scratch);
        }

        let best = scratch.iter().map(|m| m.score).fold(f64::INFINITY, f64::min);
        if best <= options.threshold {
            matches.append(&mut scratch);
        }
    }

    matches.sort_by(|a, b| a.score.total_cmp(&b.score));
    matches
}

fn match_field<'a>(
    entry: &'a DocumentEntry,
    field: FieldPath,
    weight: f64,
    query: &Query,
    options: MatchOptions,
    out: &mut Vec<FieldMatch<'a>>,
) {
    let score = |text: &str| {
        score_text(
            query.terms(),
            &text.to_lowercase(),
            options.threshold,
            options.min_match_char_length,
        )
        .map(|raw| (raw * weight).min(1.0))
    };
    let mut push = |section: Option<&'a Section>, score: f64| {
        out.push(FieldMatch {
            entry,
            field,
            section,
            score,
        });
    };

    match field {
        FieldPath::Title => {
            if let Some(s) = score(entry.title.as_str()) {
                push(None, s);
            }
        }
        FieldPath::Description => {
            if let Some(s) = score(entry.description.as_str()) {
                push(None, s);
            }
        }
        FieldPath::ContentPreview => {
            if let Some(s) = score(entry.content_preview.as_str()) {
                push(None, s);
            }
        }
        FieldPath::Keywords => {
            if let Some(s) = entry
                .keywords
                .iter()
                .filter_map(|keyword| score(keyword.as_str()))
                .reduce(f64::min)
            {
                push(None, s);
            }
        }
        FieldPath::SectionHeading | FieldPath::SectionContent => {
            for section in &entry.sections {
                let text = if field == FieldPath::SectionHeading {
                    section.heading.as_str()
                } else {
                    section.content.as_str()
                };
                if let Some(s) = score(text) {
                    push(Some(section), s);
                }
            }
        }
    }
}
