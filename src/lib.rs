//! # scholar-resolve - Researcher Profile Resolution
//!
//! Given a partial description of a person (a name, a structured registry
//! profile, or a platform identifier), scholar-resolve finds the matching
//! public researcher profiles across several weakly structured sources and
//! ranks them by evidence overlap.
//!
//! ## Core Concepts
//!
//! - **Query**: a free-text name, a registry id, a structured profile or a platform id
//! - **EvidenceProfile**: known facts about the subject (identifier, tags, co-authors)
//! - **CandidateRecord**: a normalized profile from any source
//! - **Shortlist**: the ordered result; exact identifier hits first
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use scholar_resolve::normalize::BulkRecord;
//! use scholar_resolve::sources::{InMemoryBulkDataset, InMemoryRegistry};
//! use scholar_resolve::{PlatformId, Query, Resolver, ResolverConfig};
//!
//! let bulk = InMemoryBulkDataset::from_records([BulkRecord {
//!     name: "Jane Doe".to_string(),
//!     url: Some("https://scholar.example/citations?user=ABC123456789".to_string()),
//!     platform_id: None,
//!     organization: None,
//!     domain_labels: Some(vec!["NLP".to_string()]),
//!     coauthors: None,
//!     citations: Some(42),
//!     papers: None,
//! }])?;
//!
//! let mut resolver = Resolver::new(Arc::new(bulk), Arc::new(InMemoryRegistry::new()))
//!     .with_config(ResolverConfig::immediate());
//!
//! let id = PlatformId::new("ABC123456789")?;
//! let shortlist = resolver.resolve_query(Query::Identifier(id), 3, true)?;
//! assert_eq!(shortlist.names(), vec!["Jane Doe"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod directory;
pub mod error;
pub mod identifier;
pub mod query;
pub mod record;

// Sources and normalization
pub mod normalize;
pub mod sources;

// Resolution pipeline
pub mod evidence;
pub mod operations;
pub mod pool;
pub mod resolver;
pub mod scoring;

// Re-export primary types at crate root for convenience
pub use config::ResolverConfig;
pub use directory::ProfileDirectory;
pub use error::{ResolveError, ResolveResult, SourceError, ValidationError};
pub use evidence::{EvidenceOutcome, EvidenceProfile, ExactSource};
pub use identifier::{extract_platform_id, PlatformId};
pub use normalize::{normalize, CandidatePool, RawRecord};
pub use operations::{ResolveRequest, ResolveRequestBuilder};
pub use query::{NameParts, Query, StructuredProfile};
pub use record::{CandidateRecord, Coauthor, DedupKey, Paper, RecordSource};
pub use resolver::{Resolver, RunId};
pub use scoring::{
    rank_handles, score, select, similarity, RankedHandle, ResolutionPath, ScoreVector, Shortlist,
};
pub use sources::{BulkDatasetSource, LiveProfileFetcher, RawDocument, RemoteRegistryClient};
