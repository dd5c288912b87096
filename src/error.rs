//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for the binary and collaborator glue.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods. Library entry points return the typed errors below.
pub type Result<T> = anyhow::Result<T>;

/// Malformed document markup. Recovered locally by the extractor: the entry keeps
/// its metadata but its sections degrade to an empty list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// A fenced code block opened on `line` is never closed, so every heading
    /// after it would be swallowed as code.
    #[error("unclosed code fence opened on line {line}")]
    UnclosedCodeFence { line: usize },
}

/// Frontmatter that could not be read declaratively.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("frontmatter block opened with `{delimiter}` is never closed")]
    Unterminated { delimiter: &'static str },
    #[error("malformed frontmatter on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("invalid TOML frontmatter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure to produce one raw document. The index builder skips the document
/// and counts it; the build itself never aborts.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read metadata of {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
}

impl SourceError {
    /// Path of the document that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Metadata { path, .. } => path,
        }
    }
}

/// Invalid search configuration, reported at search-call time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown field path '{0}' in weight configuration")]
    UnknownField(String),
    #[error("weight for '{field}' must be a positive finite number, got {weight}")]
    InvalidWeight { field: String, weight: f64 },
    #[error("weight configuration is empty; at least one field must be searchable")]
    NoFields,
    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Failure to read or write the serialized index artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to access index artifact at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid index artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to read or write a persisted fingerprint cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to access cache file at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode cache: {0}")]
    Codec(#[from] postcard::Error),
}

/// Failure to load the TOML configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_source_error_path() {
        let err = SourceError::Io {
            path: PathBuf::from("docs/intro.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        check!(err.path() == std::path::Path::new("docs/intro.md"));
        check!(err.to_string().contains("docs/intro.md"));
    }

    #[test]
    fn test_query_error_messages() {
        let err = QueryError::InvalidWeight {
            field: "title".to_string(),
            weight: -1.0,
        };
        check!(err.to_string() == "weight for 'title' must be a positive finite number, got -1");
    }
}
