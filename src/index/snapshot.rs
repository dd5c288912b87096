//! Atomically published corpus snapshots.

use crate::index::{BuildReport, IndexArtifact};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

/// An immutable, published corpus.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub artifact: IndexArtifact,
    /// Report of the build that produced this snapshot, if it was built in-process.
    pub report: Option<BuildReport>,
    pub published_at: SystemTime,
}

/// Shared handle to the current [`IndexSnapshot`].
///
/// Readers clone the inner `Arc` and release the lock immediately, so a
/// publish never waits for in-flight queries and never disturbs them.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    current: Arc<RwLock<Arc<IndexSnapshot>>>,
}

impl IndexHandle {
    pub fn new(artifact: IndexArtifact, report: Option<BuildReport>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(IndexSnapshot {
                artifact,
                report,
                published_at: SystemTime::now(),
            }))),
        }
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, artifact: IndexArtifact, report: Option<BuildReport>) -> Arc<IndexSnapshot> {
        let next = Arc::new(IndexSnapshot {
            artifact,
            report,
            published_at: SystemTime::now(),
        });
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, next)
    }
}

impl Default for IndexHandle {
    fn default() -> Self {
        Self::new(IndexArtifact::default(), None)
    }
}
