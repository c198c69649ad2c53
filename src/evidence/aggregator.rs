//! Evidence aggregation.
//!
//! Turns a [`Query`] into either an exact identifier hit or a set of evidence
//! profiles plus the subject name used to build the candidate pool.

use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::directory::ProfileDirectory;
use crate::error::ValidationError;
use crate::evidence::EvidenceProfile;
use crate::identifier::PlatformId;
use crate::normalize::{normalize, RawRecord};
use crate::query::{is_registry_id, NameParts, Query, StructuredProfile};
use crate::record::CandidateRecord;
use crate::sources::{
    BulkDatasetSource, FetchSession, RawDocument, RemoteRegistryClient, Throttle,
};

/// How an exact identifier hit was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactSource {
    /// The bulk dataset holds the identifier.
    BulkDataset,
    /// The live profile page for the identifier was fetched.
    LivePage,
}

/// Result of evidence aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum EvidenceOutcome {
    /// The query's identifier resolved directly; scoring is skipped.
    Exact {
        record: CandidateRecord,
        found_in: ExactSource,
    },
    /// Evidence to score a candidate pool against.
    Profiles {
        /// Subject name, when the query carries one.
        subject: Option<NameParts>,
        /// Never empty.
        profiles: Vec<EvidenceProfile>,
    },
}

/// Builds evidence profiles from queries, the profile directory and the registry.
pub struct EvidenceAggregator<'a> {
    bulk: &'a dyn BulkDatasetSource,
    registry: &'a dyn RemoteRegistryClient,
    directory: &'a ProfileDirectory,
    config: &'a ResolverConfig,
}

impl<'a> EvidenceAggregator<'a> {
    /// Creates an aggregator over the given collaborators.
    #[must_use]
    pub fn new(
        bulk: &'a dyn BulkDatasetSource,
        registry: &'a dyn RemoteRegistryClient,
        directory: &'a ProfileDirectory,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            bulk,
            registry,
            directory,
            config,
        }
    }

    /// Aggregates evidence for `query`.
    ///
    /// # Errors
    /// Returns `ValidationError` for blank names or profiles without any name.
    pub fn build_evidence(
        &self,
        query: &Query,
        session: &mut Option<FetchSession<'_>>,
        simple: bool,
    ) -> Result<EvidenceOutcome, ValidationError> {
        match query {
            Query::Identifier(id) => {
                if let Some((record, found_in)) = self.exact_by_id(id, session, simple) {
                    return Ok(EvidenceOutcome::Exact { record, found_in });
                }
                Ok(EvidenceOutcome::Profiles {
                    subject: None,
                    profiles: vec![EvidenceProfile {
                        platform_id: Some(id.clone()),
                        ..EvidenceProfile::default()
                    }],
                })
            }
            Query::Profile(profile) => self.from_structured(profile, session, simple),
            Query::Name(raw) => {
                let name = raw.trim();
                if name.is_empty() {
                    return Err(ValidationError::EmptyName);
                }
                if is_registry_id(name) {
                    if let Some(profile) = self.directory.get(name) {
                        debug!(id = name, "registry id found in profile directory");
                        return self.from_structured(profile, session, simple);
                    }
                    let subject = NameParts::from_registry_id(name)?;
                    let profiles = self.profiles_from_registry(&[name.to_string()]);
                    return Ok(EvidenceOutcome::Profiles {
                        subject: Some(subject),
                        profiles,
                    });
                }
                let subject = NameParts::parse(name)?;
                let profiles = self.profiles_from_registry(&subject.registry_ids());
                Ok(EvidenceOutcome::Profiles {
                    subject: Some(subject),
                    profiles,
                })
            }
        }
    }

    fn from_structured(
        &self,
        profile: &StructuredProfile,
        session: &mut Option<FetchSession<'_>>,
        simple: bool,
    ) -> Result<EvidenceOutcome, ValidationError> {
        let evidence = EvidenceProfile::from_content(&profile.content, &self.config.profile_link_label);
        if let Some(id) = &evidence.platform_id {
            if let Some((record, found_in)) = self.exact_by_id(id, session, simple) {
                return Ok(EvidenceOutcome::Exact { record, found_in });
            }
            debug!(%id, "identifier not resolvable directly, falling back to name search");
        }
        let subject = profile.subject_name()?;
        Ok(EvidenceOutcome::Profiles {
            subject: Some(subject),
            profiles: vec![evidence],
        })
    }

    fn exact_by_id(
        &self,
        id: &PlatformId,
        session: &mut Option<FetchSession<'_>>,
        simple: bool,
    ) -> Option<(CandidateRecord, ExactSource)> {
        match self.bulk.lookup_by_id(id) {
            Ok(Some(record)) => {
                info!(%id, "identifier found in bulk dataset");
                return Some((normalize(RawRecord::BulkDataset(record)), ExactSource::BulkDataset));
            }
            Ok(None) => {}
            Err(e) => warn!(source = self.bulk.name(), error = %e, "bulk lookup by id failed"),
        }

        let session = session.as_mut()?;
        let page = session.profile_page(&self.config.profile_url(id), simple)?;
        info!(%id, "identifier found on live profile page");
        Some((normalize(RawRecord::ProfilePage(page)), ExactSource::LivePage))
    }

    /// Fetches registry documents for `ids` and extracts one profile per
    /// document. Falls back to a single empty profile.
    #[must_use]
    pub fn profiles_from_registry(&self, ids: &[String]) -> Vec<EvidenceProfile> {
        let label = &self.config.profile_link_label;
        let mut profiles: Vec<EvidenceProfile> = self
            .probe_registry(ids)
            .iter()
            .map(|doc| EvidenceProfile::from_document(doc, label))
            .collect();
        if profiles.is_empty() {
            profiles.push(EvidenceProfile::default());
        }
        profiles
    }

    /// Probes the registry for each id.
    ///
    /// Ids ending in a digit are probed once. Other ids are probed with
    /// numbered suffixes (`id1`, `id2`, ...) until more than
    /// `max_variant_misses` probes have missed.
    #[must_use]
    pub fn probe_registry(&self, ids: &[String]) -> Vec<RawDocument> {
        let throttle = Throttle::new(self.config.registry_delay());
        let mut docs = Vec::new();

        for id in ids {
            if id.ends_with(|c: char| c.is_ascii_digit()) {
                docs.extend(self.probe(id, &throttle));
                continue;
            }

            let mut misses = 0u32;
            for n in 1..=self.config.max_variant_probes {
                if misses > self.config.max_variant_misses {
                    break;
                }
                match self.probe(&format!("{id}{n}"), &throttle) {
                    Some(doc) => docs.push(doc),
                    None => misses += 1,
                }
            }
        }

        info!(ids = ids.len(), documents = docs.len(), "registry profiles found");
        docs
    }

    fn probe(&self, identifier: &str, throttle: &Throttle) -> Option<RawDocument> {
        let result = self.registry.fetch_profile(identifier);
        throttle.pause();
        match result {
            Ok(doc) => {
                debug!(identifier, hit = doc.is_some(), "registry probe");
                doc
            }
            Err(e) => {
                warn!(source = self.registry.name(), identifier, error = %e, "registry probe failed");
                None
            }
        }
    }
}
