//! Filesystem document source.
//!
//! Walks a documentation directory in file-name order, prunes excluded
//! folders, and turns every file with a configured extension into a
//! [`RawDocument`] for the index builder.

use crate::config::Config;
use crate::error::SourceError;
use crate::extract::{DocumentFormat, split_frontmatter};
use crate::fingerprint::Fingerprint;
use crate::index::RawDocument;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Folder exclusion policy.
///
/// A pattern is a folder name (`drafts`) or a relative folder path
/// (`internal/api`). A path is excluded when its directory components contain
/// the pattern's components as a contiguous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderExclusions {
    patterns: Vec<Vec<String>>,
}

impl FolderExclusions {
    pub fn new(patterns: impl IntoIterator<Item = String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| components(&pattern).map(str::to_string).collect::<Vec<_>>())
                .filter(|pattern| !pattern.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a folder, given relative to the docs root, is excluded.
    pub fn excludes_dir(&self, relative_dir: &str) -> bool {
        let dirs: Vec<&str> = components(relative_dir).collect();
        self.patterns.iter().any(|pattern| {
            dirs.windows(pattern.len())
                .any(|window| window.iter().zip(pattern).all(|(a, b)| *a == b.as_str()))
        })
    }

    /// Whether a document, given by its relative source path, sits in an excluded folder.
    pub fn excludes_file(&self, source_path: &str) -> bool {
        let normalized = source_path.replace('\\', "/");
        match normalized.rsplit_once('/') {
            Some((dir, _)) => self.excludes_dir(dir),
            None => false,
        }
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
}

/// Documents under one directory on disk.
#[derive(Debug, Clone)]
pub struct DocsSource {
    root: PathBuf,
    extensions: Vec<String>,
    exclusions: Arc<FolderExclusions>,
}

impl DocsSource {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>, exclusions: FolderExclusions) -> Self {
        Self {
            root: root.into(),
            extensions,
            exclusions: Arc::new(exclusions),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.docs_dir.clone(),
            config.extensions.clone(),
            config.exclusions(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn has_document_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Walk the directory and read every document, in file-name order.
    ///
    /// A missing root yields a single error item rather than an empty stream,
    /// so a misconfigured `docs_dir` shows up as a failed build.
    pub fn documents(&self) -> impl Iterator<Item = Result<RawDocument, SourceError>> + '_ {
        let missing_root = (!self.root.is_dir()).then(|| SourceError::Io {
            path: self.root.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "documentation directory does not exist",
            ),
        });

        let root = self.root.clone();
        let exclusions = Arc::clone(&self.exclusions);
        let walk = WalkBuilder::new(&self.root)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                let excluded = exclusions.excludes_dir(&relative.to_string_lossy());
                if excluded {
                    tracing::debug!("Skipping excluded directory: {}", entry.path().display());
                }
                !excluded
            })
            .build();

        let walked = missing_root.is_none().then_some(walk).into_iter().flatten();
        missing_root.into_iter().map(Err).chain(walked.filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|t| t.is_file());
                (is_file && self.has_document_extension(entry.path()))
                    .then(|| read_document(&self.root, entry.path()))
            }
            Err(err) => {
                let message = err.to_string();
                Some(Err(SourceError::Io {
                    path: self.root.clone(),
                    source: err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other(message)),
                }))
            }
        }))
    }
}

/// Read one document file into a [`RawDocument`].
pub fn read_document(root: &Path, path: &Path) -> Result<RawDocument, SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(io_err)?;
    let source_path = relative_source_path(root, path);
    let fingerprint = Fingerprint::of_content(&source_path, &bytes);

    let text = String::from_utf8(bytes)
        .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    let (metadata, body) = split_frontmatter(&text).map_err(|source| SourceError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(RawDocument {
        fingerprint,
        content: body.to_string(),
        metadata,
        format: DocumentFormat::from_path(path),
        source_path,
    })
}

/// `/`-separated path of `path` relative to `root`.
fn relative_source_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
