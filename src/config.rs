//! Configuration file loading.
//!
//! Configuration is read from a TOML file located by `--config`, then the
//! `DOCSEARCH_CONFIG` environment variable, then `./docsearch.toml`. Every
//! field has a default, so a missing file means "all defaults". Relative paths
//! in a config file are resolved against the directory containing it.

use crate::error::ConfigError;
use crate::search::{FieldWeights, SearchOptions};
use crate::source::FolderExclusions;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "DOCSEARCH_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docsearch.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory of the documentation sources.
    pub docs_dir: PathBuf,
    /// Where `docsearch build` writes the index artifact.
    pub output: PathBuf,
    /// Folder names (or relative folder paths) skipped while crawling.
    pub exclude: Vec<String>,
    /// File extensions treated as documents, without the dot.
    pub extensions: Vec<String>,
    /// Fingerprint cache location; defaults to a per-project file in the user cache dir.
    pub cache_file: Option<PathBuf>,
    pub search: SearchOptions,
    pub weights: FieldWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output: PathBuf::from("static/searchIndex.json"),
            exclude: Vec::new(),
            extensions: vec!["md".to_string(), "mdx".to_string()],
            cache_file: None,
            search: SearchOptions::default(),
            weights: FieldWeights::default(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text. `path` is only used for error messages.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Locate and load the config file, falling back to defaults.
    ///
    /// An explicitly named file (argument or environment) must exist; the
    /// implicit `./docsearch.toml` is optional. Returns the file used, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let path = match named {
            Some(path) => PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref()),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.is_file() {
                    tracing::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    return Ok((Self::default(), None));
                }
                local
            }
        };

        tracing::debug!("Loading configuration from {}", path.display());
        Self::load(&path).map(|config| (config, Some(path)))
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: &Path| {
            let path = PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref());
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        self.docs_dir = resolve(&self.docs_dir);
        self.output = resolve(&self.output);
        self.cache_file = self.cache_file.as_deref().map(resolve);
        self
    }

    /// The folder exclusion predicate built from `exclude`.
    pub fn exclusions(&self) -> FolderExclusions {
        FolderExclusions::new(self.exclude.iter().cloned())
    }

    /// Artifact path for a documentation version.
    ///
    /// `static/searchIndex.json` with version `2.0` becomes
    /// `static/searchIndex.2.0.json`.
    pub fn output_for_version(&self, version: Option<&str>) -> PathBuf {
        let Some(version) = version.map(str::trim).filter(|v| !v.is_empty()) else {
            return self.output.clone();
        };
        let stem = self
            .output
            .file_stem()
            .map_or(Cow::Borrowed("searchIndex"), |s| s.to_string_lossy());
        let name = match self.output.extension() {
            Some(ext) => format!("{}.{}.{}", stem, version, ext.to_string_lossy()),
            None => format!("{}.{}", stem, version),
        };
        self.output.with_file_name(name)
    }

    /// Where the fingerprint cache lives.
    ///
    /// Without an explicit `cache_file`, each docs directory gets its own file
    /// under the user cache directory, keyed by a hash of its absolute path.
    pub fn cache_path(&self) -> PathBuf {
        if let Some(path) = &self.cache_file {
            return path.clone();
        }
        let docs = std::path::absolute(&self.docs_dir).unwrap_or_else(|_| self.docs_dir.clone());
        let key = xxh3_64(docs.to_string_lossy().as_bytes());
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("docsearch")
            .join(format!("{:016x}.cache", key))
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
