//! Candidate pool collection.
//!
//! The pool comes from the bulk dataset first. When that yields nothing, an
//! author-search cascade runs against the live fetcher, narrowing the search
//! with whatever auxiliary facts the evidence carries.

use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::evidence::EvidenceProfile;
use crate::normalize::{filter_listings, AuthorListingRecord, CandidatePool};
use crate::query::NameParts;
use crate::sources::{BulkDatasetSource, FetchSession};

/// One step of the author-search cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    /// Name plus institutional email domain.
    EmailDomain,
    /// Name plus current position.
    Position,
    /// Name plus current organization.
    Organization,
    /// Bare name; only accepted for small result sets.
    NameOnly,
}

impl CascadeStep {
    /// Steps in the order they are tried.
    pub const ORDER: [Self; 4] = [
        Self::EmailDomain,
        Self::Position,
        Self::Organization,
        Self::NameOnly,
    ];

    fn auxiliary<'e>(self, evidence: &'e [EvidenceProfile]) -> Option<&'e str> {
        match self {
            Self::EmailDomain => evidence.iter().find_map(|p| p.email_domain.as_deref()),
            Self::Position => evidence.iter().find_map(|p| p.position.as_deref()),
            Self::Organization => evidence.iter().find_map(|p| p.organization_name.as_deref()),
            Self::NameOnly => None,
        }
    }

    /// Builds the search fragment, or `None` if this step lacks its field.
    #[must_use]
    pub fn fragment(self, subject: &NameParts, evidence: &[EvidenceProfile]) -> Option<String> {
        let name = subject.display();
        match self {
            Self::NameOnly => Some(name),
            _ => self.auxiliary(evidence).map(|aux| format!("{name} {aux}")),
        }
    }

    fn accepts(self, count: usize, top_n: usize) -> bool {
        match self {
            Self::NameOnly => (1..=top_n).contains(&count),
            _ => count > 0,
        }
    }
}

/// Runs the author-search cascade and returns the first accepted listing set.
///
/// Every listing must contain each part of the subject's name.
pub fn search_cascade(
    session: &mut FetchSession<'_>,
    subject: &NameParts,
    evidence: &[EvidenceProfile],
    top_n: usize,
) -> Vec<AuthorListingRecord> {
    let fragments = subject.parts();
    for step in CascadeStep::ORDER {
        let Some(query) = step.fragment(subject, evidence) else {
            debug!(?step, "cascade step skipped, no auxiliary field");
            continue;
        };
        let listings = filter_listings(fragments, session.search(&query));
        if step.accepts(listings.len(), top_n) {
            info!(?step, count = listings.len(), "author search accepted");
            return listings;
        }
        debug!(?step, count = listings.len(), "author search rejected");
    }
    Vec::new()
}

/// Inputs for [`collect_pool`].
#[derive(Debug, Clone, Copy)]
pub struct PoolRequest<'a> {
    /// Subject name.
    pub subject: &'a NameParts,
    /// Evidence supplying auxiliary search fields.
    pub evidence: &'a [EvidenceProfile],
    /// Shortlist size, bounds the bare-name cascade step.
    pub top_n: usize,
    /// Skip paper lists when expanding listings.
    pub simple: bool,
}

/// Collects candidates for `request.subject`.
pub fn collect_pool(
    bulk: &dyn BulkDatasetSource,
    session: &mut Option<FetchSession<'_>>,
    config: &ResolverConfig,
    request: PoolRequest<'_>,
) -> CandidatePool {
    let mut pool = CandidatePool::new();
    let name = request.subject.display();

    match bulk.lookup_by_name(&name) {
        Ok(records) => {
            for record in records {
                pool.push_raw(record);
            }
        }
        Err(e) => warn!(source = bulk.name(), name = %name, error = %e, "bulk lookup by name failed"),
    }
    if !pool.is_empty() {
        info!(candidates = pool.len(), "candidates from bulk dataset");
        return pool;
    }

    let Some(session) = session.as_mut() else {
        debug!("no live fetcher, candidate pool stays empty");
        return pool;
    };

    let listings = search_cascade(session, request.subject, request.evidence, request.top_n);
    for listing in listings {
        if config.expand_listings {
            match session.profile_page(&listing.url, request.simple) {
                Some(page) => {
                    pool.push_raw(page);
                    continue;
                }
                None => debug!(url = %listing.url, "listing not expandable, keeping summary"),
            }
        }
        pool.push_raw(listing);
    }
    info!(candidates = pool.len(), "candidates from author search");
    pool
}
