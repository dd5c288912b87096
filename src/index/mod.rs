//! Index construction, persistence and publication.

pub mod artifact;
pub mod builder;
pub mod cache;
pub mod snapshot;

pub use artifact::IndexArtifact;
pub use builder::{BuildOutcome, BuildReport, BuildStatus, IndexBuilder, RawDocument, normalize_url};
pub use cache::FingerprintCache;
pub use snapshot::{IndexHandle, IndexSnapshot};
