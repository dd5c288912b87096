//! Field weight configuration.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A searchable field of a [`DocumentEntry`](crate::types::DocumentEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Title,
    Description,
    Keywords,
    ContentPreview,
    SectionHeading,
    SectionContent,
}

impl FieldPath {
    /// Canonical dotted path, as written in the artifact and config.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Keywords => "keywords",
            Self::ContentPreview => "contentPreview",
            Self::SectionHeading => "sections.heading",
            Self::SectionContent => "sections.content",
        }
    }

    /// True for fields that live on a section rather than on the document.
    pub const fn is_section_field(self) -> bool {
        matches!(self, Self::SectionHeading | Self::SectionContent)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "keywords" => Ok(Self::Keywords),
            "contentPreview" | "content" => Ok(Self::ContentPreview),
            "sections.heading" | "sections[].heading" => Ok(Self::SectionHeading),
            "sections.content" | "sections[].content" => Ok(Self::SectionContent),
            other => Err(QueryError::UnknownField(other.to_string())),
        }
    }
}

/// Dotted field path to weight.
///
/// A weight multiplies a field's match distance, so a field with a lower
/// weight ranks its matches higher. Kept as raw strings so an artifact written
/// with an unknown path still loads; paths are checked by [`FieldWeights::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldWeights(BTreeMap<String, f64>);

impl Default for FieldWeights {
    fn default() -> Self {
        Self::from_pairs([
            ("title", 0.5),
            ("sections.heading", 0.6),
            ("keywords", 0.7),
            ("description", 0.8),
            ("sections.content", 0.9),
            ("contentPreview", 1.0),
        ])
    }
}

impl FieldWeights {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(field, weight)| (field.to_string(), weight))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.0.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate every entry and return the searchable fields.
    ///
    /// Aliases of the same field resolve once; the last spelling in key order wins.
    pub fn resolve(&self) -> Result<Vec<(FieldPath, f64)>, QueryError> {
        if self.0.is_empty() {
            return Err(QueryError::NoFields);
        }

        let mut resolved: BTreeMap<FieldPath, f64> = BTreeMap::new();
        for (field, &weight) in &self.0 {
            let path: FieldPath = field.parse()?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(QueryError::InvalidWeight {
                    field: field.clone(),
                    weight,
                });
            }
            resolved.insert(path, weight);
        }
        Ok(resolved.into_iter().collect())
    }
}
