//! The serialized index artifact consumed by search surfaces.

use crate::error::ArtifactError;
use crate::search::FieldWeights;
use crate::types::DocumentEntry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A built corpus plus the field weights it should be searched with.
///
/// Serialized as `{"entries": [...], "weights": {"title": 0.5, ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexArtifact {
    pub entries: Vec<DocumentEntry>,
    #[serde(default)]
    pub weights: FieldWeights,
}

impl IndexArtifact {
    pub fn new(entries: Vec<DocumentEntry>, weights: FieldWeights) -> Self {
        Self { entries, weights }
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read an artifact written by [`IndexArtifact::write`].
    pub fn read(path: &Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Write the artifact as pretty JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json()?).map_err(io_err)?;
        tracing::info!(
            "Wrote index artifact with {} entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LastUpdate, Section, section_url};
    use assert2::{check, let_assert};
    use rstest::rstest;
    use tempfile::TempDir;

    fn sample() -> IndexArtifact {
        IndexArtifact::new(
            vec![DocumentEntry {
                id: "install".to_string(),
                title: "Install Guide".to_string(),
                description: "How to install".to_string(),
                keywords: vec!["setup".to_string()],
                last_update: Some(LastUpdate {
                    date: "2024-03-01T12:00:00Z".to_string(),
                    author: Some("ana".to_string()),
                }),
                url: "/install".to_string(),
                content_preview: "# Install".to_string(),
                sections: vec![Section {
                    id: "prerequisites".to_string(),
                    heading: "Prerequisites".to_string(),
                    level: 2,
                    content: "Rust 1.85".to_string(),
                    url: section_url("/install", "prerequisites"),
                }],
            }],
            FieldWeights::default(),
        )
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let artifact = sample();
        let_assert!(Ok(json) = artifact.to_json());
        let_assert!(Ok(back) = IndexArtifact::from_json(&json));
        check!(back == artifact);
    }

    #[rstest]
    #[case(0.986_690_694_632_869_5)]
    #[case(0.213_918_907_267_134_58)]
    #[case(f64::MIN_POSITIVE)]
    #[case(1.0 - f64::EPSILON)]
    fn test_weights_round_trip_exactly(#[case] weight: f64) {
        let mut artifact = sample();
        artifact.weights = FieldWeights::from_pairs([("title", weight), ("sections.content", weight / 3.0)]);
        let_assert!(Ok(json) = artifact.to_json());
        let_assert!(Ok(back) = IndexArtifact::from_json(&json));
        check!(back.weights.get("title").map(f64::to_bits) == Some(weight.to_bits()));
        check!(back == artifact);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = sample().to_json().unwrap();
        check!(json.contains("\"contentPreview\""));
        check!(json.contains("\"lastUpdate\""));
        check!(json.contains("\"sections.heading\""));
    }

    #[test]
    fn test_missing_weights_default() {
        let_assert!(Ok(artifact) = IndexArtifact::from_json(r#"{"entries": []}"#));
        check!(artifact.weights == FieldWeights::default());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("static/searchIndex.json");
        let artifact = sample();
        artifact.write(&path).unwrap();
        let_assert!(Ok(back) = IndexArtifact::read(&path));
        check!(back == artifact);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let_assert!(Err(ArtifactError::Io { .. }) = IndexArtifact::read(&dir.path().join("nope.json")));
    }
}
