//! Fingerprint cache of extracted entries, persisted between builds.
//!
//! The cache is a plain value owned by the caller of the index builder. On
//! disk it is a postcard file tagged with a format version; a file that cannot
//! be decoded is treated as empty.

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::types::DocumentEntry;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bumped whenever [`DocumentEntry`] changes shape.
const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: Vec<(Fingerprint, DocumentEntry)>,
}

/// Extracted entries keyed by the fingerprint of the source they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintCache {
    entries: AHashMap<Fingerprint, DocumentEntry>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&DocumentEntry> {
        self.entries.get(fingerprint)
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, entry: DocumentEntry) {
        self.entries.insert(fingerprint, entry);
    }

    /// Drop every entry whose fingerprint is not in `seen`.
    pub fn retain_seen(&mut self, seen: &AHashSet<Fingerprint>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|fingerprint, _| seen.contains(fingerprint));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a cache file. A missing file yields an empty cache.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let file: CacheFile = postcard::from_bytes(&bytes)?;
        if file.version != CACHE_FORMAT_VERSION {
            tracing::info!(
                "Cache at {} has format version {} (expected {}), starting fresh",
                path.display(),
                file.version,
                CACHE_FORMAT_VERSION
            );
            return Ok(Self::new());
        }
        Ok(Self {
            entries: file.entries.into_iter().collect(),
        })
    }

    /// Like [`FingerprintCache::load`], but any failure yields an empty cache.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cache) => {
                tracing::debug!("Loaded {} cached entries from {}", cache.len(), path.display());
                cache
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable cache {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Persist the cache, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(fingerprint, entry)| (*fingerprint, entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.1.url.cmp(&b.1.url));

        let file = CacheFile {
            version: CACHE_FORMAT_VERSION,
            entries,
        };
        let bytes = postcard::to_stdvec(&file)?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        tracing::debug!("Saved {} cache entries to {}", self.len(), path.display());
        Ok(())
    }
}
