//! Evidence profiles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identifier::PlatformId;
use crate::query::ProfileContent;
use crate::record::{normalize_label, normalize_person_name};
use crate::sources::RawDocument;

/// Known facts about the query subject, used as ground truth when scoring.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvidenceProfile {
    /// Exact-match key, highest-weight signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<PlatformId>,

    /// Normalized topical tags.
    #[serde(default)]
    pub domain_labels: BTreeSet<String>,

    /// Normalized co-author names.
    #[serde(default)]
    pub coauthors: BTreeSet<String>,

    /// Current position; only used to build search queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// Current organization; only used to build search queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,

    /// Institutional email domain; only used to build search queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_domain: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl EvidenceProfile {
    /// Extracts evidence from profile content.
    ///
    /// `link_label` names the link that points at the platform profile.
    /// Missing sections produce empty collections.
    #[must_use]
    pub fn from_content(content: &ProfileContent, link_label: &str) -> Self {
        let platform_id = content.platform_url(link_label).and_then(PlatformId::from_url);

        let domain_labels = content
            .expertise
            .iter()
            .flatten()
            .flat_map(|e| e.keywords.iter())
            .filter_map(|k| normalize_label(k))
            .collect();

        let coauthors = content
            .relations
            .iter()
            .flatten()
            .map(|r| normalize_person_name(&r.name))
            .filter(|n| !n.is_empty())
            .collect();

        let current = content.current_history();
        let institution = current.and_then(|h| h.institution.as_ref());

        Self {
            platform_id,
            domain_labels,
            coauthors,
            position: non_blank(current.and_then(|h| h.position.as_ref())),
            organization_name: non_blank(institution.and_then(|i| i.name.as_ref())),
            email_domain: non_blank(institution.and_then(|i| i.domain.as_ref())),
        }
    }

    /// Extracts evidence from a registry document.
    #[must_use]
    pub fn from_document(document: &RawDocument, link_label: &str) -> Self {
        Self::from_content(&document.profile_content(), link_label)
    }

    /// Returns true if the profile carries no scoring signal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.platform_id.is_none() && self.domain_labels.is_empty() && self.coauthors.is_empty()
    }
}
