//! Shared search state and background index builds.
//!
//! The state owns the published corpus ([`IndexHandle`]) and the fingerprint
//! cache. Builds run on a blocking thread while holding the cache lock, so
//! rebuilds are serialized and publish in the order they started.

use crate::config::Config;
use crate::error::Result;
use crate::index::{BuildOutcome, BuildReport, FingerprintCache, IndexArtifact, IndexBuilder, IndexHandle, IndexSnapshot};
use crate::source::DocsSource;
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Build a corpus from the configured docs directory.
pub fn build_index(config: &Config, cache: &mut FingerprintCache) -> BuildOutcome {
    let source = DocsSource::from_config(config);
    let exclusions = config.exclusions();
    tracing::info!("Indexing documents under {}", source.root().display());
    IndexBuilder::new(config.weights.clone())
        .with_exclude(move |path| exclusions.excludes_file(path))
        .build(source.documents(), cache)
}

/// State shared by every tool call of one server.
pub struct SearchState {
    config: Config,
    handle: IndexHandle,
    cache: Arc<Mutex<FingerprintCache>>,
}

impl std::fmt::Debug for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchState")
            .field("docs_dir", &self.config.docs_dir)
            .field("entries", &self.handle.snapshot().artifact.entries.len())
            .finish()
    }
}

impl SearchState {
    /// Create state with an empty corpus and the persisted cache, if any.
    pub fn new(config: Config) -> Self {
        let cache = FingerprintCache::load_or_default(&config.cache_path());
        Self {
            config,
            handle: IndexHandle::default(),
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.handle.snapshot()
    }

    /// Publish the artifact previously written to `config.output`, if present.
    pub fn load_artifact(&self) -> Result<bool> {
        if !self.config.output.is_file() {
            return Ok(false);
        }
        let artifact = IndexArtifact::read(&self.config.output)
            .with_context(|| format!("Failed to load index from {}", self.config.output.display()))?;
        tracing::info!(
            "Loaded {} entries from {}",
            artifact.entries.len(),
            self.config.output.display()
        );
        self.handle.publish(artifact, None);
        Ok(true)
    }

    /// Rebuild from the docs directory and publish the result.
    ///
    /// The previous corpus keeps serving queries until the new one is published.
    pub async fn rebuild(&self) -> Result<BuildReport> {
        let cache = Arc::clone(&self.cache).lock_owned().await;
        let config = self.config.clone();

        let (outcome, cache) = tokio::task::spawn_blocking(move || {
            let mut cache = cache;
            let outcome = build_index(&config, &mut cache);
            if let Err(e) = cache.save(&config.cache_path()) {
                tracing::warn!("Failed to persist fingerprint cache: {}", e);
            }
            (outcome, cache)
        })
        .await
        .context("Index build task panicked")?;

        let report = outcome.report.clone();
        self.handle.publish(outcome.artifact, Some(outcome.report));
        drop(cache);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BuildStatus;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            docs_dir: dir.path().join("docs"),
            output: dir.path().join("out/searchIndex.json"),
            cache_file: Some(dir.path().join("cache.bin")),
            ..Config::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rebuild_publishes_and_persists_cache() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/intro.md"), "---\ntitle: Intro\n---\n# Hello\n").unwrap();

        let state = SearchState::new(config_in(&dir));
        let_assert!(Ok(report) = state.rebuild().await);
        check!(report.status() == BuildStatus::Complete);
        check!(state.snapshot().artifact.entries[0].url == "/intro");
        check!(dir.path().join("cache.bin").is_file());

        let again = SearchState::new(config_in(&dir));
        let_assert!(Ok(report) = again.rebuild().await);
        check!(report.reused == 1);
    }

    #[test]
    fn test_load_artifact() {
        let dir = TempDir::new().unwrap();
        let state = SearchState::new(config_in(&dir));
        check!(matches!(state.load_artifact(), Ok(false)));

        IndexArtifact::default().write(&state.config().output).unwrap();
        check!(matches!(state.load_artifact(), Ok(true)));
    }
}
