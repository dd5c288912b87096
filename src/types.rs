//! Indexed document shapes and query results.
//!
//! These types form the serialized index artifact, so every field round-trips
//! through JSON and through the postcard-encoded fingerprint cache. Avoid
//! `skip_serializing_if` here: postcard relies on every field being present.

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in [`DocumentEntry::content_preview`].
pub const CONTENT_PREVIEW_CHARS: usize = 300;

/// Maximum number of characters kept in [`Section::content`].
pub const SECTION_CONTENT_CHARS: usize = 200;

/// The indexed representation of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub last_update: Option<LastUpdate>,
    pub url: String,
    pub content_preview: String,
    pub sections: Vec<Section>,
}

impl DocumentEntry {
    /// Re-anchor the entry (and every section URL) at a new document URL.
    ///
    /// Used when a cached entry is reused for a document whose normalized URL
    /// changed, keeping `section.url == url + "#" + section.id`.
    pub fn relocate(&mut self, url: &str) {
        if self.url == url {
            return;
        }
        self.url = url.to_string();
        for section in &mut self.sections {
            section.url = section_url(url, &section.id);
        }
    }
}

/// When and by whom a document was last changed. `date` is an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUpdate {
    pub date: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// A heading-delimited, independently searchable part of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub heading: String,
    pub level: u8,
    pub content: String,
    pub url: String,
}

/// Build the URL of a section anchored inside its document.
pub fn section_url(document_url: &str, section_id: &str) -> String {
    format!("{}#{}", document_url, section_id)
}

/// Whether a result points at a whole document or at one of its sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Document,
    Section,
}

/// One ranked search hit, ready for display.
///
/// `title` holds the document title for document results and the heading for
/// section results. Lower `score` is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub score: f64,
    pub url: String,
    pub title: String,
    pub preview_content: String,
    pub parent_title: Option<String>,
    pub parent_url: Option<String>,
    pub last_update: Option<LastUpdate>,
    pub search_term: String,
}

/// Truncate to at most `max` characters without splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn entry_with_section() -> DocumentEntry {
        DocumentEntry {
            id: "install".to_string(),
            title: "Install Guide".to_string(),
            description: String::new(),
            keywords: vec![],
            last_update: None,
            url: "/install".to_string(),
            content_preview: String::new(),
            sections: vec![Section {
                id: "prerequisites".to_string(),
                heading: "Prerequisites".to_string(),
                level: 2,
                content: String::new(),
                url: section_url("/install", "prerequisites"),
            }],
        }
    }

    #[test]
    fn test_section_url_anchors_on_document() {
        let entry = entry_with_section();
        check!(entry.sections[0].url == "/install#prerequisites");
    }

    #[test]
    fn test_relocate_rewrites_section_urls() {
        let mut entry = entry_with_section();
        entry.relocate("/guides/install");
        check!(entry.url == "/guides/install");
        check!(entry.sections[0].url == "/guides/install#prerequisites");
    }

    #[rstest]
    #[case("hello", 10, "hello")]
    #[case("hello", 3, "hel")]
    #[case("héllo wörld", 4, "héll")]
    #[case("", 5, "")]
    fn test_truncate_chars(#[case] input: &str, #[case] max: usize, #[case] expected: &str) {
        check!(truncate_chars(input, max) == expected);
    }

    #[test]
    fn test_match_result_serializes_type_tag() {
        let result = MatchResult {
            kind: ResultKind::Section,
            score: 0.4,
            url: "/a#b".to_string(),
            title: "B".to_string(),
            preview_content: String::new(),
            parent_title: Some("A".to_string()),
            parent_url: Some("/a".to_string()),
            last_update: None,
            search_term: "b".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        check!(json["type"] == "section");
        check!(json["parentUrl"] == "/a");
        check!(json["searchTerm"] == "b");
    }
}
