//! Record normalization.
//!
//! Each source delivers records in its own shape. [`RawRecord`] is the tagged
//! union of those shapes; [`normalize`] turns any of them into a
//! [`CandidateRecord`]. [`CandidatePool`] collects normalized records and
//! drops duplicates by [`DedupKey`](crate::record::DedupKey).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identifier::PlatformId;
use crate::record::{normalize_labels, CandidateRecord, Coauthor, DedupKey, Paper, RecordSource};

static EMAIL_DOMAIN_RE: OnceLock<Regex> = OnceLock::new();

const EMAIL_DOMAIN_PATTERN: &str = r"[\w-]+\.[\w.-]+";

fn email_domain_regex() -> &'static Regex {
    EMAIL_DOMAIN_RE
        .get_or_init(|| Regex::new(EMAIL_DOMAIN_PATTERN).expect("valid email domain pattern"))
}

/// A row of the bulk offline dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRecord {
    /// Display name.
    pub name: String,
    /// Profile URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Stored identifier; re-derived from `url` when missing or malformed.
    #[serde(default, alias = "gs_sid")]
    pub platform_id: Option<String>,
    /// Affiliation.
    #[serde(default)]
    pub organization: Option<String>,
    /// Topical tags, already normalized by the dataset.
    #[serde(default)]
    pub domain_labels: Option<Vec<String>>,
    /// Listed co-authors.
    #[serde(default, alias = "co_authors")]
    pub coauthors: Option<Vec<Coauthor>>,
    /// Total citation count.
    #[serde(default)]
    pub citations: Option<u64>,
    /// Publications.
    #[serde(default)]
    pub papers: Option<Vec<Paper>>,
}

/// A record scraped from a live profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePageRecord {
    /// Page URL.
    pub url: String,
    /// Name shown in the page header.
    pub name: String,
    /// Affiliation line.
    #[serde(default)]
    pub organization: Option<String>,
    /// Raw interest labels.
    #[serde(default)]
    pub domain_labels: Vec<String>,
    /// `None` when the page has no co-author panel.
    #[serde(default)]
    pub coauthors: Option<Vec<Coauthor>>,
    /// Total citation count.
    #[serde(default)]
    pub citations: Option<u64>,
    /// Publications; `None` in simple mode.
    #[serde(default)]
    pub papers: Option<Vec<Paper>>,
}

/// An entry of an author-search listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorListingRecord {
    /// Profile URL the entry links to.
    pub url: String,
    /// Displayed name.
    pub name: String,
    /// Position / organization line.
    #[serde(default)]
    pub affiliation: Option<String>,
    /// Raw email line, e.g. `Verified email at cs.example.edu`.
    #[serde(default)]
    pub email: Option<String>,
    /// Raw citation line, e.g. `Cited by 1234`.
    #[serde(default)]
    pub cited_by: Option<String>,
    /// Raw interest labels.
    #[serde(default)]
    pub domain_labels: Vec<String>,
}

/// Source-specific record shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RawRecord {
    /// Bulk offline dataset row.
    BulkDataset(BulkRecord),
    /// Live profile page.
    ProfilePage(ProfilePageRecord),
    /// Author-search listing entry.
    AuthorListing(AuthorListingRecord),
}

impl From<BulkRecord> for RawRecord {
    fn from(value: BulkRecord) -> Self {
        Self::BulkDataset(value)
    }
}

impl From<ProfilePageRecord> for RawRecord {
    fn from(value: ProfilePageRecord) -> Self {
        Self::ProfilePage(value)
    }
}

impl From<AuthorListingRecord> for RawRecord {
    fn from(value: AuthorListingRecord) -> Self {
        Self::AuthorListing(value)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Converts a source-specific record into the common candidate schema.
#[must_use]
pub fn normalize(raw: RawRecord) -> CandidateRecord {
    match raw {
        RawRecord::BulkDataset(r) => {
            let platform_id = r
                .platform_id
                .as_deref()
                .and_then(|s| PlatformId::new(s).ok())
                .or_else(|| r.url.as_deref().and_then(PlatformId::from_url));
            CandidateRecord {
                platform_id,
                url: non_blank(r.url),
                name: r.name.trim().to_string(),
                organization: non_blank(r.organization),
                email_domain: None,
                domain_labels: r.domain_labels.map(normalize_labels),
                coauthors: r.coauthors,
                citations: r.citations,
                papers: r.papers,
                source: RecordSource::BulkDataset,
            }
        }
        RawRecord::ProfilePage(r) => CandidateRecord {
            platform_id: PlatformId::from_url(&r.url),
            url: non_blank(Some(r.url)),
            name: r.name.trim().to_string(),
            organization: non_blank(r.organization),
            email_domain: None,
            domain_labels: Some(normalize_labels(r.domain_labels)),
            coauthors: r.coauthors,
            citations: r.citations,
            papers: r.papers,
            source: RecordSource::WebCrawl,
        },
        RawRecord::AuthorListing(r) => CandidateRecord {
            platform_id: PlatformId::from_url(&r.url),
            url: non_blank(Some(r.url)),
            name: r.name.trim().to_string(),
            organization: non_blank(r.affiliation),
            email_domain: r.email.as_deref().and_then(extract_email_domain),
            domain_labels: Some(normalize_labels(r.domain_labels)),
            coauthors: None,
            citations: r.cited_by.as_deref().and_then(parse_citation_count),
            papers: None,
            source: RecordSource::WebCrawl,
        },
    }
}

/// Extracts the first email-domain-looking token (`word.word...`).
///
/// ```
/// use scholar_resolve::normalize::extract_email_domain;
///
/// assert_eq!(
///     extract_email_domain("Verified email at cs.example.edu").as_deref(),
///     Some("cs.example.edu")
/// );
/// assert_eq!(extract_email_domain("No verified email"), None);
/// ```
#[must_use]
pub fn extract_email_domain(email: &str) -> Option<String> {
    email_domain_regex()
        .find(email.trim()).map(|m| m.as_str().to_string())
}

fn parse_citation_count(line: &str) -> Option<u64> {
    line.split_whitespace()
        .find(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .and_then(|t| t.parse().ok())
}

/// Returns true when every query fragment occurs (case-insensitively) in `displayed`.
///
/// ```
/// use scholar_resolve::normalize::name_matches;
///
/// assert!(name_matches(&["John", "Smith"], "John Q. Smith"));
/// assert!(!name_matches(&["Jane", "Smith"], "John Q. Smith"));
/// ```
#[must_use]
pub fn name_matches<S: AsRef<str>>(fragments: &[S], displayed: &str) -> bool {
    let displayed = displayed.to_lowercase();
    fragments
        .iter()
        .all(|f| displayed.contains(&f.as_ref().to_lowercase()))
}

/// Drops author listings whose displayed name misses a query fragment.
#[must_use]
pub fn filter_listings<S: AsRef<str>>(
    fragments: &[S],
    listings: Vec<AuthorListingRecord>,
) -> Vec<AuthorListingRecord> {
    let before = listings.len();
    let kept: Vec<_> = listings
        .into_iter()
        .filter(|l| name_matches(fragments, &l.name))
        .collect();
    if kept.len() != before {
        debug!(before, after = kept.len(), "name filter discarded listings");
    }
    kept
}

/// Ordered, duplicate-free collection of normalized candidates.
#[derive(Debug, Default)]
pub struct CandidatePool {
    records: Vec<CandidateRecord>,
    seen: HashSet<DedupKey>,
}

impl CandidatePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and appends a record. Returns false if it was a duplicate.
    pub fn push_raw(&mut self, raw: impl Into<RawRecord>) -> bool {
        self.push(normalize(raw.into()))
    }

    /// Appends a normalized record. Returns false if it was a duplicate.
    pub fn push(&mut self, record: CandidateRecord) -> bool {
        if let Some(key) = record.dedup_key() {
            if !self.seen.insert(key) {
                debug!(name = %record.name, "dropping duplicate candidate");
                return false;
            }
        }
        self.records.push(record);
        true
    }

    /// Number of candidates in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Candidates in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[CandidateRecord] {
        &self.records
    }

    /// Consumes the pool.
    #[must_use]
    pub fn into_records(self) -> Vec<CandidateRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, url: &str) -> AuthorListingRecord {
        AuthorListingRecord {
            url: url.to_string(),
            name: name.to_string(),
            affiliation: Some("Professor, Example University".to_string()),
            email: Some("Verified email at cs.example.edu".to_string()),
            cited_by: Some("Cited by 1234".to_string()),
            domain_labels: vec!["Machine Learning".to_string(), " NLP".to_string()],
        }
    }

    #[test]
    fn bulk_record_keeps_absent_labels() {
        let raw = BulkRecord {
            name: " Jane Doe ".to_string(),
            url: Some("https://x/citations?user=ABC123456789".to_string()),
            platform_id: None,
            organization: None,
            domain_labels: None,
            coauthors: None,
            citations: None,
            papers: None,
        };
        let rec = normalize(raw.into());
        assert_eq!(rec.name, "Jane Doe");
        assert_eq!(rec.platform_id.unwrap().as_str(), "ABC123456789");
        assert!(rec.domain_labels.is_none());
        assert_eq!(rec.source, RecordSource::BulkDataset);
    }

    #[test]
    fn bulk_record_prefers_stored_id() {
        let raw: BulkRecord = serde_json::from_value(serde_json::json!({
            "name": "Jane Doe",
            "url": "https://x/citations?user=ZZZZZZZZZZZZ",
            "gs_sid": "ABC123456789",
            "domain_labels": ["NLP"],
            "co_authors": [["https://x/?user=BBBBBBBBBBBB", "Bob Roe"]]
        }))
        .unwrap();
        let rec = normalize(raw.into());
        assert_eq!(rec.platform_id.unwrap().as_str(), "ABC123456789");
        assert_eq!(rec.coauthors.unwrap()[0].name, "Bob Roe");
        assert!(rec.domain_labels.unwrap().contains("nlp"));
    }

    #[test]
    fn listing_extracts_email_domain_and_citations() {
        let rec = normalize(listing("Jane Doe", "https://x/citations?user=ABC123456789&hl=en").into());
        assert_eq!(rec.email_domain.as_deref(), Some("cs.example.edu"));
        assert_eq!(rec.citations, Some(1234));
        assert_eq!(rec.platform_id.unwrap().as_str(), "ABC123456789");
        let labels = rec.domain_labels.unwrap();
        assert!(labels.contains("machine_learning"));
        assert!(labels.contains("nlp"));
    }

    #[test]
    fn listing_without_email_domain_is_absent() {
        let mut raw = listing("Jane Doe", "https://x");
        raw.email = Some("No verified email".to_string());
        raw.cited_by = None;
        let rec = normalize(raw.into());
        assert!(rec.email_domain.is_none());
        assert!(rec.citations.is_none());
        assert!(rec.platform_id.is_none());
    }

    #[test]
    fn name_filter_is_substring_based() {
        assert!(name_matches(&["John", "Smith"], "John Q. Smith"));
        assert!(name_matches(&["john", "SMITH"], "John Q. Smith"));
        assert!(!name_matches(&["Jane", "Smith"], "John Q. Smith"));

        let kept = filter_listings(
            &["John", "Smith"],
            vec![listing("John Q. Smith", "https://a"), listing("Jane Smith", "https://b")],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://a");
    }

    #[test]
    fn raw_record_tagged_by_source() {
        let raw: RawRecord = serde_json::from_value(serde_json::json!({
            "source": "profile_page",
            "url": "https://x/citations?user=ABC123456789",
            "name": "Jane Doe",
            "domain_labels": ["Vision"]
        }))
        .unwrap();
        let rec = normalize(raw);
        assert_eq!(rec.source, RecordSource::WebCrawl);
        assert!(rec.coauthors.is_none());
    }

    #[test]
    fn pool_drops_duplicates() {
        let mut pool = CandidatePool::new();
        assert!(pool.push_raw(listing("Jane Doe", "https://x/?user=ABC123456789")));
        assert!(!pool.push_raw(listing("Jane Doe", "https://y/?user=ABC123456789")));
        assert!(pool.push_raw(listing("Jane Doe", "https://z")));
        assert!(!pool.push_raw(listing("J. Doe", "https://z")));
        assert!(pool.push(CandidateRecord::new("No Key", RecordSource::WebCrawl)));
        assert!(pool.push(CandidateRecord::new("No Key", RecordSource::WebCrawl)));
        assert_eq!(pool.len(), 4);
    }
}
