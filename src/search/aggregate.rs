//! Grouping of flat field matches into a document → section result list.

use crate::search::matcher::FieldMatch;
use crate::types::{DocumentEntry, MatchResult, ResultKind, Section, truncate_chars};
use ahash::{AHashMap, AHashSet};

/// Score added to a document's score for each of its section results.
pub const SECTION_PENALTY: f64 = 0.1;

/// Characters of `contentPreview` used when a document has no description.
const DOCUMENT_PREVIEW_CHARS: usize = 150;

struct Group<'a> {
    entry: &'a DocumentEntry,
    own_score: Option<f64>,
    sections: Vec<(&'a Section, f64)>,
}

impl Group<'_> {
    /// Own-field score, or the best section score for placeholder documents.
    fn document_score(&self) -> f64 {
        self.own_score.unwrap_or_else(|| {
            self.sections
                .iter()
                .map(|(_, score)| *score)
                .fold(1.0, f64::min)
        })
    }
}

/// Turn flat matches into ranked results.
///
/// Every matched document appears once, immediately followed by its matched
/// sections. Groups are ordered by document score, sections by their own match
/// score. The expanded list is cut to `max_results`.
pub fn aggregate(matches: &[FieldMatch<'_>], max_results: usize, search_term: &str) -> Vec<MatchResult> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut by_url: AHashMap<&str, usize> = AHashMap::new();

    for m in matches {
        let index = *by_url.entry(m.entry.url.as_str()).or_insert_with(|| {
            groups.push(Group {
                entry: m.entry,
                own_score: None,
                sections: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[index];

        match m.section {
            None => {
                group.own_score = Some(group.own_score.map_or(m.score, |s| s.min(m.score)));
            }
            Some(section) => {
                if let Some(existing) = group
                    .sections
                    .iter_mut()
                    .find(|(s, _)| s.url == section.url)
                {
                    existing.1 = existing.1.min(m.score);
                } else {
                    group.sections.push((section, m.score));
                }
            }
        }
    }

    let mut ranked: Vec<(f64, Group<'_>)> = groups
        .into_iter()
        .map(|mut group| {
            group.sections.sort_by(|a, b| a.1.total_cmp(&b.1));
            (group.document_score(), group)
        })
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut seen: AHashSet<(ResultKind, String)> = AHashSet::new();
    let mut results = Vec::new();
    for (score, group) in ranked {
        let entry = group.entry;
        let document = document_result(entry, score, search_term);
        if seen.insert((document.kind, document.url.clone())) {
            results.push(document);
        }

        let section_score = (score + SECTION_PENALTY).min(1.0);
        for (section, _) in group.sections {
            let result = section_result(entry, section, section_score, search_term);
            if seen.insert((result.kind, result.url.clone())) {
                results.push(result);
            }
        }
    }

    results.truncate(max_results);
    results
}

fn document_result(entry: &DocumentEntry, score: f64, search_term: &str) -> MatchResult {
    let preview = if entry.description.is_empty() {
        truncate_chars(&entry.content_preview, DOCUMENT_PREVIEW_CHARS).to_string()
    } else {
        entry.description.clone()
    };
    MatchResult {
        kind: ResultKind::Document,
        score,
        url: entry.url.clone(),
        title: entry.title.clone(),
        preview_content: preview,
        parent_title: None,
        parent_url: None,
        last_update: entry.last_update.clone(),
        search_term: search_term.to_string(),
    }
}

fn section_result(entry: &DocumentEntry, section: &Section, score: f64, search_term: &str) -> MatchResult {
    MatchResult {
        kind: ResultKind::Section,
        score,
        url: section.url.clone(),
        title: section.heading.clone(),
        preview_content: section.content.clone(),
        parent_title: Some(entry.title.clone()),
        parent_url: Some(entry.url.clone()),
        last_update: entry.last_update.clone(),
        search_term: search_term.to_string(),
    }
}
