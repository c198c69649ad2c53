//! Candidate scoring against evidence profiles.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::evidence::EvidenceProfile;
use crate::record::{normalize_person_name, CandidateRecord};

/// Match signals for one candidate against its best evidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreVector {
    /// Candidate identifier equals some evidence profile's identifier.
    pub identifier_match: bool,
    /// Share of candidate tags found in the best-matching profile, in `[0, 1]`.
    pub tag_overlap: f64,
    /// Share of candidate co-authors found in the best-matching profile, in `[0, 1]`.
    pub relation_overlap: f64,
}

impl ScoreVector {
    /// `identifier_match` as `0` or `1`.
    #[must_use]
    pub const fn identifier_bit(&self) -> u8 {
        if self.identifier_match {
            1
        } else {
            0
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn best_ratio(hits: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let best = hits.iter().copied().max().unwrap_or(0);
    (best as f64 / total as f64).clamp(0.0, 1.0)
}

/// Scores one candidate against every profile.
///
/// The tag denominator accumulates over all profiles (`|tags| * |profiles|`)
/// while the relation denominator is per profile (`|coauthors|`). Both are
/// kept as-is for parity with established rankings.
#[must_use]
pub fn score_candidate(candidate: &CandidateRecord, evidence: &[EvidenceProfile]) -> ScoreVector {
    let mut identifier_match = false;
    let mut tag_hits = vec![0usize; evidence.len()];
    let mut tag_total = 0usize;
    let mut rel_hits = vec![0usize; evidence.len()];
    let mut rel_total = 0usize;

    let coauthor_names: Option<Vec<String>> = candidate
        .coauthors
        .as_ref()
        .map(|cs| cs.iter().map(|c| normalize_person_name(&c.name)).collect());

    for (p, profile) in evidence.iter().enumerate() {
        if let (Some(ours), Some(theirs)) = (&candidate.platform_id, &profile.platform_id) {
            if ours == theirs {
                identifier_match = true;
            }
        }

        if let Some(labels) = &candidate.domain_labels {
            for label in labels {
                tag_total += 1;
                if profile.domain_labels.contains(label) {
                    tag_hits[p] += 1;
                }
            }
        }

        rel_total = 0;
        if let Some(names) = &coauthor_names {
            for name in names {
                rel_total += 1;
                if profile.coauthors.contains(name) {
                    rel_hits[p] += 1;
                }
            }
        }
    }

    ScoreVector {
        identifier_match,
        tag_overlap: best_ratio(&tag_hits, tag_total),
        relation_overlap: best_ratio(&rel_hits, rel_total),
    }
}

/// Scores every candidate in `pool`; entry `i` belongs to `pool[i]`.
///
/// # Errors
/// Returns `ValidationError::NoEvidenceProfiles` when `evidence` is empty.
pub fn score(
    pool: &[CandidateRecord],
    evidence: &[EvidenceProfile],
) -> Result<Vec<ScoreVector>, ValidationError> {
    if evidence.is_empty() {
        return Err(ValidationError::NoEvidenceProfiles);
    }
    Ok(pool.iter().map(|c| score_candidate(c, evidence)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::PlatformId;
    use crate::record::{normalize_labels, Coauthor, RecordSource};

    fn pid(s: &str) -> PlatformId {
        PlatformId::new(s).unwrap()
    }

    fn profile(tags: &[&str], coauthors: &[&str]) -> EvidenceProfile {
        EvidenceProfile {
            domain_labels: normalize_labels(tags),
            coauthors: coauthors.iter().map(|c| normalize_person_name(c)).collect(),
            ..EvidenceProfile::default()
        }
    }

    #[test]
    fn zero_profiles_rejected() {
        let pool = vec![CandidateRecord::new("A", RecordSource::BulkDataset)];
        assert!(matches!(score(&pool, &[]), Err(ValidationError::NoEvidenceProfiles)));
    }

    #[test]
    fn identifier_match_requires_both_sides() {
        let cand = CandidateRecord::new("A", RecordSource::BulkDataset).with_platform_id(pid("ABC123456789"));
        let mut ev = profile(&[], &[]);
        assert_eq!(score_candidate(&cand, &[ev.clone()]).identifier_bit(), 0);

        ev.platform_id = Some(pid("ABC123456789"));
        let other = EvidenceProfile {
            platform_id: Some(pid("ZZZZZZZZZZZZ")),
            ..EvidenceProfile::default()
        };
        assert_eq!(score_candidate(&cand, &[other.clone(), ev]).identifier_bit(), 1);

        let bare = CandidateRecord::new("B", RecordSource::BulkDataset);
        assert_eq!(score_candidate(&bare, &[other]).identifier_bit(), 0);
    }

    #[test]
    fn tag_denominator_spans_all_profiles() {
        let cand = CandidateRecord::new("A", RecordSource::BulkDataset).with_domain_labels(["nlp"]);
        let single = score_candidate(&cand, &[profile(&["nlp", "vision"], &[])]);
        assert!((single.tag_overlap - 1.0).abs() < f64::EPSILON);

        let double = score_candidate(&cand, &[profile(&[], &[]), profile(&["nlp", "vision"], &[])]);
        assert!((double.tag_overlap - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn relation_denominator_is_per_profile() {
        let cand = CandidateRecord::new("A", RecordSource::BulkDataset).with_coauthors(vec![
            Coauthor::new("", "Bob Roe"),
            Coauthor::new("", "Carol Poe"),
        ]);
        let s = score_candidate(
            &cand,
            &[profile(&[], &["bob  roe"]), profile(&[], &["Bob Roe", "Carol Poe"])],
        );
        assert!((s.relation_overlap - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_and_empty_signals_score_zero() {
        let ev = [profile(&["nlp"], &["Bob Roe"])];
        let absent = CandidateRecord::new("A", RecordSource::BulkDataset);
        let s = score_candidate(&absent, &ev);
        assert_eq!(s, ScoreVector::default());

        let empty = CandidateRecord::new("B", RecordSource::BulkDataset)
            .with_domain_labels(Vec::<String>::new())
            .with_coauthors(Vec::new());
        let s = score_candidate(&empty, &ev);
        assert!(s.tag_overlap == 0.0 && s.relation_overlap == 0.0);
        assert!(!s.tag_overlap.is_nan());
    }

    #[test]
    fn overlaps_stay_in_unit_interval() {
        let cand = CandidateRecord::new("A", RecordSource::BulkDataset)
            .with_domain_labels(["a", "b", "c"])
            .with_coauthors(vec![Coauthor::new("", "X"), Coauthor::new("", "Y")]);
        let ev = [profile(&["a", "b", "c"], &["x", "y"]), profile(&["a"], &["x"])];
        let s = score_candidate(&cand, &ev);
        assert!((0.0..=1.0).contains(&s.tag_overlap));
        assert!((0.0..=1.0).contains(&s.relation_overlap));
        assert!((s.tag_overlap - 0.5).abs() < f64::EPSILON);
        assert!((s.relation_overlap - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_preserves_pool_order() {
        let pool = vec![
            CandidateRecord::new("A", RecordSource::BulkDataset).with_domain_labels(["x"]),
            CandidateRecord::new("B", RecordSource::BulkDataset).with_domain_labels(["nlp"]),
        ];
        let scores = score(&pool, &[profile(&["nlp"], &[])]).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0].tag_overlap == 0.0);
        assert!(scores[1].tag_overlap == 1.0);
    }
}
