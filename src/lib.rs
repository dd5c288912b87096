//! Fuzzy documentation search.
//!
//! Markdown and MDX documents are extracted into entries with heading-delimited
//! sections ([`extract`]), assembled into a cached, atomically published corpus
//! ([`index`]), and queried with typo-tolerant weighted matching that ranks
//! documents followed by their matching sections ([`search`]).

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod index;
pub mod search;
pub mod server;
pub mod source;
pub mod tools;
pub mod tracing;
pub mod types;
pub mod worker;

pub use config::Config;
pub use error::{ArtifactError, CacheError, ConfigError, ExtractError, MetadataError, QueryError, SourceError};
pub use extract::{DocumentFormat, DocumentMetadata, extract_document, heading_id, split_frontmatter};
pub use fingerprint::Fingerprint;
pub use index::{
    BuildOutcome, BuildReport, BuildStatus, FingerprintCache, IndexArtifact, IndexBuilder, IndexHandle, RawDocument,
};
pub use search::{FieldWeights, SearchOptions, Segment, highlight, search};
pub use types::{DocumentEntry, LastUpdate, MatchResult, ResultKind, Section};
