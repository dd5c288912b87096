//! Corpus assembly from a collaborator-supplied document stream.

use crate::error::SourceError;
use crate::extract::{DocumentFormat, DocumentMetadata, Extraction, extract_document};
use crate::fingerprint::Fingerprint;
use crate::index::{FingerprintCache, IndexArtifact};
use crate::search::FieldWeights;
use crate::types::DocumentEntry;
use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// One source document as handed over by a collaborator.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Path relative to the documentation root, `/` or `\` separated.
    pub source_path: String,
    pub fingerprint: Fingerprint,
    /// Body text with any frontmatter already removed.
    pub content: String,
    pub metadata: DocumentMetadata,
    pub format: DocumentFormat,
}

/// Overall outcome of a build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStatus {
    /// Every document was either indexed or deliberately excluded.
    Complete,
    /// At least one document failed, at least one did not.
    Partial,
    /// Nothing to index and nothing failed.
    Empty,
    /// Every document in the stream failed.
    AllFailed,
}

/// Counters describing one build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub total: usize,
    pub indexed: usize,
    pub reused: usize,
    pub extracted: usize,
    pub degraded: usize,
    pub excluded_drafts: usize,
    pub excluded_untitled: usize,
    pub excluded_by_policy: usize,
    pub failed: usize,
    pub url_collisions: usize,
}

impl BuildReport {
    pub const fn status(&self) -> BuildStatus {
        if self.failed == 0 {
            if self.indexed == 0 {
                BuildStatus::Empty
            } else {
                BuildStatus::Complete
            }
        } else if self.failed == self.total {
            BuildStatus::AllFailed
        } else {
            BuildStatus::Partial
        }
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} indexed of {} ({} reused, {} extracted, {} degraded), \
             excluded {} draft / {} untitled / {} by policy, {} failed, {} URL collisions",
            self.status(),
            self.indexed,
            self.total,
            self.reused,
            self.extracted,
            self.degraded,
            self.excluded_drafts,
            self.excluded_untitled,
            self.excluded_by_policy,
            self.failed,
            self.url_collisions
        )
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub artifact: IndexArtifact,
    pub report: BuildReport,
}

type ExcludePredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Turns raw documents into an [`IndexArtifact`].
pub struct IndexBuilder {
    weights: FieldWeights,
    exclude: Option<ExcludePredicate>,
}

impl fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("weights", &self.weights)
            .field("exclude", &self.exclude.is_some())
            .finish()
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(FieldWeights::default())
    }
}

/// Where an entry in traversal order comes from.
enum Slot {
    Reused(DocumentEntry),
    Extracted,
}

struct Pending {
    document: RawDocument,
    url: String,
}

impl IndexBuilder {
    pub fn new(weights: FieldWeights) -> Self {
        Self {
            weights,
            exclude: None,
        }
    }

    /// Skip every document whose source path the predicate returns true for.
    #[must_use]
    pub fn with_exclude(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.exclude = Some(Box::new(predicate));
        self
    }

    /// Build a corpus, reusing and then refreshing `cache`.
    ///
    /// Entries keep traversal order. Per-document failures are logged and
    /// counted in the report; the build itself never fails.
    pub fn build<I>(&self, documents: I, cache: &mut FingerprintCache) -> BuildOutcome
    where
        I: IntoIterator<Item = Result<RawDocument, SourceError>>,
    {
        let start = Instant::now();
        let mut report = BuildReport::default();
        let mut slots = Vec::new();
        let mut pending = Vec::new();
        let mut seen = AHashSet::new();

        for item in documents {
            report.total += 1;
            let document = match item {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", e.path().display(), e);
                    report.failed += 1;
                    continue;
                }
            };

            if self.exclude.as_ref().is_some_and(|exclude| exclude(&document.source_path)) {
                tracing::debug!("Excluded by policy: {}", document.source_path);
                report.excluded_by_policy += 1;
                continue;
            }
            if document.metadata.draft {
                tracing::debug!("Skipping draft: {}", document.source_path);
                report.excluded_drafts += 1;
                continue;
            }
            if document.metadata.title.trim().is_empty() {
                tracing::debug!("Skipping untitled document: {}", document.source_path);
                report.excluded_untitled += 1;
                continue;
            }

            let url = normalize_url(&document.source_path);
            seen.insert(document.fingerprint);

            if let Some(cached) = cache.get(&document.fingerprint) {
                tracing::debug!("Cache hit for {} ({})", document.source_path, document.fingerprint);
                let mut entry = cached.clone();
                entry.relocate(&url);
                report.reused += 1;
                slots.push(Slot::Reused(entry));
            } else {
                slots.push(Slot::Extracted);
                pending.push(Pending { document, url });
            }
        }

        let extractions: Vec<Extraction> = pending
            .par_iter()
            .map(|p| {
                extract_document(
                    &p.document.content,
                    &p.document.metadata,
                    p.document.format,
                    &p.url,
                )
            })
            .collect();

        report.extracted = extractions.len();
        let mut fresh = Vec::with_capacity(extractions.len());
        for (p, extraction) in pending.iter().zip(extractions) {
            if let Some(err) = &extraction.degraded {
                tracing::warn!("Indexed {} without sections: {}", p.document.source_path, err);
                report.degraded += 1;
            }
            cache.insert(p.document.fingerprint, extraction.entry.clone());
            fresh.push(extraction.entry);
        }
        let pruned = cache.retain_seen(&seen);
        if pruned > 0 {
            tracing::debug!("Pruned {} stale cache entries", pruned);
        }

        let mut fresh = fresh.into_iter();
        let mut entries: Vec<DocumentEntry> = Vec::with_capacity(slots.len());
        let mut positions: AHashMap<String, usize> = AHashMap::with_capacity(slots.len());
        for slot in slots {
            let entry = match slot {
                Slot::Reused(entry) => entry,
                Slot::Extracted => match fresh.next() {
                    Some(entry) => entry,
                    None => continue,
                },
            };

            if let Some(&position) = positions.get(&entry.url) {
                tracing::warn!(
                    "URL collision at {}: '{}' replaces '{}'",
                    entry.url,
                    entry.title,
                    entries[position].title
                );
                report.url_collisions += 1;
                entries[position] = entry;
            } else {
                positions.insert(entry.url.clone(), entries.len());
                entries.push(entry);
            }
        }

        report.indexed = entries.len();
        tracing::info!("Index build finished in {:?}: {}", start.elapsed(), report);

        BuildOutcome {
            artifact: IndexArtifact::new(entries, self.weights.clone()),
            report,
        }
    }
}

/// Map a source path to its document URL.
///
/// `guides/install.md` → `/guides/install`, `guides/index.md` → `/guides`,
/// `guides/guides.mdx` → `/guides`, `index.md` → `/`.
pub fn normalize_url(source_path: &str) -> String {
    let path = source_path.replace('\\', "/");
    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if let Some(last) = segments.last_mut() {
        let name: &str = *last;
        if let Some((stem, _)) = name.rsplit_once('.')
            && !stem.is_empty()
        {
            *last = stem;
        }
    }

    let len = segments.len();
    if segments.last() == Some(&"index") || (len >= 2 && segments[len - 1] == segments[len - 2]) {
        segments.pop();
    }

    format!("/{}", segments.join("/"))
}
