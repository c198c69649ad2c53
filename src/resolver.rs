//! The resolution facade.
//!
//! [`Resolver`] owns the collaborators and runs one resolution per call:
//! evidence aggregation, pool collection, scoring and selection. Each run
//! gets a [`RunId`] attached to its tracing span and, when a live fetcher is
//! configured, a single [`FetchSession`] that is closed when the run ends.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::config::ResolverConfig;
use crate::directory::ProfileDirectory;
use crate::error::{ResolveResult, ValidationError};
use crate::evidence::{EvidenceAggregator, EvidenceOutcome};
use crate::operations::{ResolveRequest, ResolveRequestBuilder};
use crate::pool::{collect_pool, PoolRequest};
use crate::query::Query;
use crate::scoring::{score, select, Shortlist};
use crate::sources::{BulkDatasetSource, FetchSession, LiveProfileFetcher, RemoteRegistryClient};

/// Unique identifier of one resolution run.
///
/// ```
/// use scholar_resolve::RunId;
///
/// let id = RunId::new();
/// assert!(!id.is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Researcher-profile resolver.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use scholar_resolve::sources::{InMemoryBulkDataset, InMemoryRegistry};
/// use scholar_resolve::{Resolver, ResolverConfig};
///
/// let mut resolver = Resolver::new(
///     Arc::new(InMemoryBulkDataset::new()),
///     Arc::new(InMemoryRegistry::new()),
/// )
/// .with_config(ResolverConfig::immediate());
///
/// let shortlist = resolver.resolve_query("Jane Doe", 3, true).unwrap();
/// assert!(shortlist.is_empty());
/// ```
pub struct Resolver {
    bulk: Arc<dyn BulkDatasetSource>,
    registry: Arc<dyn RemoteRegistryClient>,
    fetcher: Option<Box<dyn LiveProfileFetcher>>,
    directory: ProfileDirectory,
    config: ResolverConfig,
}

impl Resolver {
    /// Creates a resolver without a live fetcher and with default configuration.
    #[must_use]
    pub fn new(bulk: Arc<dyn BulkDatasetSource>, registry: Arc<dyn RemoteRegistryClient>) -> Self {
        Self {
            bulk,
            registry,
            fetcher: None,
            directory: ProfileDirectory::new(),
            config: ResolverConfig::default(),
        }
    }

    /// Attaches a live profile fetcher.
    #[must_use]
    pub fn with_live_fetcher(mut self, fetcher: Box<dyn LiveProfileFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Attaches a local profile directory.
    #[must_use]
    pub fn with_directory(mut self, directory: ProfileDirectory) -> Self {
        self.directory = directory;
        self
    }

    /// Loads the local profile directory from JSON files, later files winning.
    ///
    /// # Errors
    /// Returns `ResolveError::Source` if a file cannot be read or parsed.
    pub fn load_directory<P: AsRef<Path>>(mut self, paths: &[P]) -> ResolveResult<Self> {
        self.directory = ProfileDirectory::load(paths)?;
        Ok(self)
    }

    /// Replaces the configuration. It is validated at the start of every run.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Local profile directory.
    #[must_use]
    pub const fn directory(&self) -> &ProfileDirectory {
        &self.directory
    }

    /// Returns the live fetcher, e.g. to inspect a test double after a run.
    pub fn live_fetcher_mut(&mut self) -> Option<&mut (dyn LiveProfileFetcher + 'static)> {
        self.fetcher.as_deref_mut()
    }

    /// Resolves `query` into at most `top_n` candidates (plus any exact-tier overflow).
    ///
    /// # Errors
    /// See [`Resolver::resolve`].
    pub fn resolve_query(
        &mut self,
        query: impl Into<Query>,
        top_n: usize,
        simple: bool,
    ) -> ResolveResult<Shortlist> {
        let builder = ResolveRequestBuilder::new().query(query).top_n(top_n);
        let builder = if simple { builder.simple() } else { builder.full() };
        self.resolve(builder.build()?)
    }

    /// Runs one resolution.
    ///
    /// Collaborator failures are logged and treated as empty results; "found
    /// nothing" is an empty shortlist.
    ///
    /// # Errors
    /// Returns `ResolveError::Validation` for invalid configuration, a blank
    /// name, `top_n == 0`, or a profile query without any recoverable name.
    pub fn resolve(&mut self, request: ResolveRequest) -> ResolveResult<Shortlist> {
        request.validate()?;
        self.config.validate()?;

        let run_id = RunId::new();
        let span = info_span!("resolve", %run_id);
        let _guard = span.enter();

        let config = &self.config;
        let bulk: &dyn BulkDatasetSource = &*self.bulk;
        let registry: &dyn RemoteRegistryClient = &*self.registry;

        let top_n = request.top_n().unwrap_or(config.top_n);
        if top_n == 0 {
            return Err(ValidationError::InvalidTopN { value: 0 }.into());
        }
        let simple = request.simple().unwrap_or(config.simple);

        let mut session = self
            .fetcher
            .as_deref_mut()
            .and_then(|f| FetchSession::open(f, config.page_delay()));

        let aggregator = EvidenceAggregator::new(bulk, registry, &self.directory, config);
        let outcome = aggregator.build_evidence(request.query(), &mut session, simple)?;

        let mut shortlist = match outcome {
            EvidenceOutcome::Exact { record, found_in } => {
                info!(?found_in, name = %record.name, "resolved by identifier");
                Shortlist::exact(record, found_in)
            }
            EvidenceOutcome::Profiles {
                subject: None,
                profiles,
            } => {
                debug!(profiles = profiles.len(), "no subject name, nothing to search");
                Shortlist::empty()
            }
            EvidenceOutcome::Profiles {
                subject: Some(subject),
                profiles,
            } => {
                let pool = collect_pool(
                    bulk,
                    &mut session,
                    config,
                    PoolRequest {
                        subject: &subject,
                        evidence: &profiles,
                        top_n,
                        simple,
                    },
                );
                let scores = score(pool.as_slice(), &profiles)?;
                select(pool.as_slice(), &scores, top_n, config.cap_exact_matches)?
            }
        };
        drop(session);

        if simple {
            shortlist.strip_papers();
        }
        info!(candidates = shortlist.len(), resolved_via = ?shortlist.resolved_via, "resolution finished");
        Ok(shortlist)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("bulk", &self.bulk.name())
            .field("registry", &self.registry.name())
            .field("fetcher", &self.fetcher.as_ref().map(|x| x.name().to_string()))
            .field("directory", &self.directory.len())
            .field("config", &self.config)
            .finish()
    }
}
