//! Normalized candidate records.
//!
//! Every source adapter produces its own record shape (see
//! [`crate::normalize::RawRecord`]). After normalization all of them become a
//! [`CandidateRecord`], and nothing downstream branches on the source.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::PlatformId;

/// Which adapter produced a record. Diagnostics only; never used in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Bulk offline dataset.
    BulkDataset,
    /// Remote profile registry.
    RemoteRegistry,
    /// Live profile-page or author-listing crawl.
    WebCrawl,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BulkDataset => write!(f, "bulk_dataset"),
            Self::RemoteRegistry => write!(f, "remote_registry"),
            Self::WebCrawl => write!(f, "web_crawl"),
        }
    }
}

/// A co-author entry: `(url, name, extra...)`.
///
/// Serialized as a flat sequence, the shape the bulk dataset stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Coauthor {
    /// Profile URL of the co-author (may be empty).
    pub url: String,
    /// Display name of the co-author.
    pub name: String,
    /// Additional scraped fields (affiliation, etc.).
    pub extra: Vec<String>,
}

impl Coauthor {
    /// Creates a co-author entry without extra fields.
    #[must_use]
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            extra: Vec::new(),
        }
    }
}

impl TryFrom<Vec<String>> for Coauthor {
    type Error = String;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        let mut fields = value.into_iter();
        let url = fields.next().unwrap_or_default();
        let Some(name) = fields.next() else {
            return Err("co-author entry needs at least (url, name)".to_string());
        };
        Ok(Self {
            url,
            name,
            extra: fields.collect(),
        })
    }
}

impl From<Coauthor> for Vec<String> {
    fn from(value: Coauthor) -> Self {
        let mut out = Vec::with_capacity(2 + value.extra.len());
        out.push(value.url);
        out.push(value.name);
        out.extend(value.extra);
        out
    }
}

/// A publication listed on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title.
    pub title: String,
    /// Link to the paper page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Authors / venue lines as scraped.
    #[serde(default)]
    pub info: Vec<String>,
    /// Citation count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<u64>,
    /// Publication year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

/// Key used to detect duplicate candidates across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Platform identifier, when known.
    Platform(PlatformId),
    /// Profile URL otherwise.
    Url(String),
}

/// A normalized researcher profile candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Platform identifier extracted from the profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<PlatformId>,

    /// Profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Display name.
    pub name: String,

    /// Organization or affiliation line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Verified email domain (e.g. `cs.example.edu`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_domain: Option<String>,

    /// Normalized topical tags. `None` means no signal, not zero overlap.
    #[serde(default)]
    pub domain_labels: Option<BTreeSet<String>>,

    /// Co-authors in listed order. `None` means the source had no co-author panel.
    #[serde(default)]
    pub coauthors: Option<Vec<Coauthor>>,

    /// Total citation count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<u64>,

    /// Paper list; stripped in simple mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub papers: Option<Vec<Paper>>,

    /// Producing adapter.
    pub source: RecordSource,
}

impl CandidateRecord {
    /// Creates a bare record with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>, source: RecordSource) -> Self {
        Self {
            platform_id: None,
            url: None,
            name: name.into(),
            organization: None,
            email_domain: None,
            domain_labels: None,
            coauthors: None,
            citations: None,
            papers: None,
            source,
        }
    }

    /// Sets the platform identifier.
    #[must_use]
    pub fn with_platform_id(mut self, id: PlatformId) -> Self {
        self.platform_id = Some(id);
        self
    }

    /// Sets the profile URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the domain labels, normalizing each one.
    #[must_use]
    pub fn with_domain_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domain_labels = Some(normalize_labels(labels));
        self
    }

    /// Sets the co-authors.
    #[must_use]
    pub fn with_coauthors(mut self, coauthors: Vec<Coauthor>) -> Self {
        self.coauthors = Some(coauthors);
        self
    }

    /// Returns the deduplication key: platform id first, URL second.
    #[must_use]
    pub fn dedup_key(&self) -> Option<DedupKey> {
        if let Some(id) = &self.platform_id {
            return Some(DedupKey::Platform(id.clone()));
        }
        self.url
            .as_ref()
            .filter(|u| !u.trim().is_empty())
            .map(|u| DedupKey::Url(u.trim().to_string()))
    }

    /// Drops the paper list.
    pub fn strip_papers(&mut self) {
        self.papers = None;
    }
}

/// Normalizes one topical tag: trimmed, lower-cased, inner whitespace joined by `_`.
///
/// Returns `None` for blank input.
#[must_use]
pub fn normalize_label(label: &str) -> Option<String> {
    let joined = label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Normalizes a collection of tags into a set, dropping blanks.
#[must_use]
pub fn normalize_labels<I, S>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|l| normalize_label(l.as_ref()))
        .collect()
}

/// Normalizes a person name for equality checks (case and spacing insensitive).
#[must_use]
pub fn normalize_person_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
