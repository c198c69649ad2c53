//! In-memory collaborator implementations.
//!
//! Thread-safe implementations of the source traits, intended for embedded
//! usage, tests, and as a reference for network-backed adapters.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use regex::RegexBuilder;

use crate::error::SourceError;
use crate::identifier::PlatformId;
use crate::normalize::{AuthorListingRecord, BulkRecord, ProfilePageRecord};
use crate::sources::traits::{
    BulkDatasetSource, LiveProfileFetcher, RawDocument, RemoteRegistryClient,
};

fn lock_err(context: &'static str) -> SourceError {
    SourceError::Backend(format!("poisoned lock: {context}"))
}

fn record_id(record: &BulkRecord) -> Option<PlatformId> {
    record
        .platform_id
        .as_deref()
        .and_then(|s| PlatformId::new(s).ok())
        .or_else(|| record.url.as_deref().and_then(PlatformId::from_url))
}

#[derive(Debug, Default)]
struct BulkState {
    records: Vec<BulkRecord>,
    by_id: HashMap<PlatformId, usize>,
}

/// Bulk dataset held in memory.
///
/// Name lookup returns exact name matches followed by records whose name
/// matches `^First .*Last` case-insensitively, deduplicated by URL.
#[derive(Debug, Default)]
pub struct InMemoryBulkDataset {
    state: RwLock<BulkState>,
}

impl InMemoryBulkDataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dataset from records.
    pub fn from_records(records: impl IntoIterator<Item = BulkRecord>) -> Result<Self, SourceError> {
        let dataset = Self::new();
        for record in records {
            dataset.insert(record)?;
        }
        Ok(dataset)
    }

    /// Loads a dataset from a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let records: Vec<BulkRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Adds a record. A later record with the same identifier shadows the earlier one.
    pub fn insert(&self, record: BulkRecord) -> Result<(), SourceError> {
        let mut state = self.state.write().map_err(|_| lock_err("bulk.insert"))?;
        let idx = state.records.len();
        if let Some(id) = record_id(&record) {
            state.by_id.insert(id, idx);
        }
        state.records.push(record);
        Ok(())
    }

    /// Number of records.
    pub fn len(&self) -> Result<usize, SourceError> {
        let state = self.state.read().map_err(|_| lock_err("bulk.len"))?;
        Ok(state.records.len())
    }

    /// Returns true if the dataset holds no records.
    pub fn is_empty(&self) -> Result<bool, SourceError> {
        Ok(self.len()? == 0)
    }
}

impl BulkDatasetSource for InMemoryBulkDataset {
    fn name(&self) -> &str {
        "in_memory_bulk"
    }

    fn lookup_by_id(&self, id: &PlatformId) -> Result<Option<BulkRecord>, SourceError> {
        let state = self.state.read().map_err(|_| lock_err("bulk.lookup_by_id"))?;
        Ok(state.by_id.get(id).map(|&idx| state.records[idx].clone()))
    }

    fn lookup_by_name(&self, name: &str) -> Result<Vec<BulkRecord>, SourceError> {
        let parts: Vec<&str> = name.split_whitespace().collect();
        let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
            return Ok(Vec::new());
        };
        let exact = parts.join(" ");
        let pattern = format!("^{} .*{}", regex::escape(first), regex::escape(last));
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SourceError::Backend(format!("invalid name pattern: {e}")))?;

        let state = self.state.read().map_err(|_| lock_err("bulk.lookup_by_name"))?;
        let records = state.records.iter().enumerate();
        let exact_hits = records.clone().filter(|(_, r)| r.name == exact);
        let pattern_hits = records.filter(|(_, r)| re.is_match(&r.name));

        let mut seen_rows: HashSet<usize> = HashSet::new();
        let mut seen_urls: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for (idx, record) in exact_hits.chain(pattern_hits) {
            if !seen_rows.insert(idx) {
                continue;
            }
            if let Some(url) = record.url.as_deref() {
                if !seen_urls.insert(url) {
                    continue;
                }
            }
            out.push(record.clone());
        }
        Ok(out)
    }
}

/// Registry documents held in memory, keyed by identifier.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    documents: RwLock<HashMap<String, RawDocument>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document under `identifier`.
    pub fn insert(
        &self,
        identifier: impl Into<String>,
        document: impl Into<RawDocument>,
    ) -> Result<(), SourceError> {
        let mut docs = self.documents.write().map_err(|_| lock_err("registry.insert"))?;
        docs.insert(identifier.into(), document.into());
        Ok(())
    }
}

impl RemoteRegistryClient for InMemoryRegistry {
    fn name(&self) -> &str {
        "in_memory_registry"
    }

    fn fetch_profile(&self, identifier: &str) -> Result<Option<RawDocument>, SourceError> {
        let docs = self.documents.read().map_err(|_| lock_err("registry.fetch_profile"))?;
        Ok(docs.get(identifier).cloned())
    }
}

/// Live fetcher answering from canned pages and listings.
///
/// Tracks how often its session was opened and closed, and which search
/// fragments were requested.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    pages: HashMap<String, ProfilePageRecord>,
    listings: HashMap<String, Vec<AuthorListingRecord>>,
    searches: Vec<String>,
    opened: usize,
    closed: usize,
}

impl InMemoryFetcher {
    /// Creates a fetcher with no pages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile page under its URL.
    #[must_use]
    pub fn with_page(mut self, page: ProfilePageRecord) -> Self {
        self.pages.insert(page.url.clone(), page);
        self
    }

    /// Registers listing results for an exact search fragment.
    #[must_use]
    pub fn with_listing(
        mut self,
        query_fragment: impl Into<String>,
        listings: Vec<AuthorListingRecord>,
    ) -> Self {
        self.listings.insert(query_fragment.into(), listings);
        self
    }

    /// Search fragments requested so far, in order.
    #[must_use]
    pub fn searches(&self) -> &[String] {
        &self.searches
    }

    /// Number of sessions opened.
    #[must_use]
    pub const fn opened(&self) -> usize {
        self.opened
    }

    /// Number of sessions closed.
    #[must_use]
    pub const fn closed(&self) -> usize {
        self.closed
    }
}

impl LiveProfileFetcher for InMemoryFetcher {
    fn name(&self) -> &str {
        "in_memory_fetcher"
    }

    fn open(&mut self) -> Result<(), SourceError> {
        self.opened += 1;
        Ok(())
    }

    fn fetch_profile_page(
        &mut self,
        url: &str,
        simple: bool,
    ) -> Result<Option<ProfilePageRecord>, SourceError> {
        let mut page = self.pages.get(url).cloned();
        if simple {
            if let Some(p) = page.as_mut() {
                p.papers = None;
            }
        }
        Ok(page)
    }

    fn fetch_search_results(
        &mut self,
        query_fragment: &str,
    ) -> Result<Vec<AuthorListingRecord>, SourceError> {
        self.searches.push(query_fragment.to_string());
        Ok(self.listings.get(query_fragment).cloned().unwrap_or_default())
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}
