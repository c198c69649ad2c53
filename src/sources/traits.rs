//! Collaborator contracts.
//!
//! These traits define what the resolver needs from the outside world. How an
//! implementation fetches its data (files, HTTP, browser automation) is not
//! the resolver's concern. By using traits, we enable:
//! - In-memory sources for tests and embedded use
//! - Network-backed sources in production

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::SourceError;
use crate::identifier::PlatformId;
use crate::normalize::{AuthorListingRecord, BulkRecord, ProfilePageRecord};
use crate::query::ProfileContent;

/// A raw profile document returned by the remote registry.
///
/// Registry pages embed the profile under `props.pageProps.profile`; bare
/// profile objects are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDocument(serde_json::Value);

impl RawDocument {
    /// Wraps a JSON value.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Decodes the profile section.
    ///
    /// Sections are decoded independently and malformed entries are dropped,
    /// so one broken entry only costs its own section.
    #[must_use]
    pub fn profile_content(&self) -> ProfileContent {
        let node = self
            .0
            .pointer("/props/pageProps/profile")
            .or_else(|| self.0.get("profile"))
            .unwrap_or(&self.0);
        let node = node.get("content").unwrap_or(node);
        ProfileContent {
            gscholar: node
                .get("gscholar")
                .and_then(Value::as_str)
                .map(str::to_string),
            links: decode_section(node, "links").unwrap_or_default(),
            expertise: decode_section(node, "expertise"),
            relations: decode_section(node, "relations"),
            history: decode_section(node, "history"),
            names: decode_section(node, "names").unwrap_or_default(),
        }
    }
}

/// Decodes the list under `key` entry by entry. `None` if the key is absent.
fn decode_section<T: DeserializeOwned>(node: &Value, key: &str) -> Option<Vec<T>> {
    let items = node.get(key).filter(|v| !v.is_null())?;
    let Some(items) = items.as_array() else {
        warn!(section = key, "profile section is not a list, ignored");
        return None;
    };
    let mut decoded = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for item in items {
        match T::deserialize(item) {
            Ok(entry) => decoded.push(entry),
            Err(e) => {
                dropped += 1;
                warn!(section = key, error = %e, "malformed profile entry dropped");
            }
        }
    }
    if dropped > 0 {
        warn!(section = key, dropped, kept = decoded.len(), "profile section partially decoded");
    }
    Some(decoded)
}

impl From<serde_json::Value> for RawDocument {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Bulk offline dataset of pre-parsed records.
pub trait BulkDatasetSource: Send + Sync {
    /// Name of the source (for logging).
    fn name(&self) -> &str;

    /// Finds the record carrying `id`, if any.
    fn lookup_by_id(&self, id: &PlatformId) -> Result<Option<BulkRecord>, SourceError>;

    /// Finds records matching a `First Last` name.
    fn lookup_by_name(&self, name: &str) -> Result<Vec<BulkRecord>, SourceError>;
}

/// Remote profile registry.
pub trait RemoteRegistryClient: Send + Sync {
    /// Name of the source (for logging).
    fn name(&self) -> &str;

    /// Fetches the profile document for a registry id or name fragment.
    ///
    /// `Ok(None)` means the registry answered but has no such profile.
    fn fetch_profile(&self, identifier: &str) -> Result<Option<RawDocument>, SourceError>;
}

/// Live page fetcher (browser automation or equivalent).
///
/// Implementations hold a session that is opened once per resolution run and
/// closed when the run ends; see [`FetchSession`](super::FetchSession).
pub trait LiveProfileFetcher: Send {
    /// Name of the source (for logging).
    fn name(&self) -> &str;

    /// Acquires the underlying session.
    fn open(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Fetches and parses a profile page. `simple` skips the paper list.
    ///
    /// `Ok(None)` means the page lacked the expected structure.
    fn fetch_profile_page(
        &mut self,
        url: &str,
        simple: bool,
    ) -> Result<Option<ProfilePageRecord>, SourceError>;

    /// Runs an author search and returns the listing entries.
    fn fetch_search_results(
        &mut self,
        query_fragment: &str,
    ) -> Result<Vec<AuthorListingRecord>, SourceError>;

    /// Releases the underlying session.
    fn close(&mut self) {}
}
