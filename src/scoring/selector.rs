//! Tiered shortlist selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::evidence::ExactSource;
use crate::record::{CandidateRecord, DedupKey};
use crate::scoring::ScoreVector;

/// How the shortlist was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "path", content = "source")]
pub enum ResolutionPath {
    /// An exact identifier hit; no scoring happened.
    Exact(ExactSource),
    /// The candidate pool was scored and ranked.
    Ranked,
}

/// Final ordered result of a resolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortlist {
    /// Ordered candidates, best first.
    pub candidates: Vec<CandidateRecord>,
    /// Path that produced the list.
    pub resolved_via: ResolutionPath,
}

impl Shortlist {
    /// Creates an empty ranked shortlist.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            resolved_via: ResolutionPath::Ranked,
        }
    }

    /// A one-element shortlist from an exact identifier hit.
    #[must_use]
    pub fn exact(record: CandidateRecord, found_in: ExactSource) -> Self {
        Self {
            candidates: vec![record],
            resolved_via: ResolutionPath::Exact(found_in),
        }
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if no candidate was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterates candidates in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, CandidateRecord> {
        self.candidates.iter()
    }

    /// Candidate names in rank order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name.as_str()).collect()
    }

    /// Drops every candidate's paper list.
    pub fn strip_papers(&mut self) {
        for c in &mut self.candidates {
            c.strip_papers();
        }
    }
}

impl IntoIterator for Shortlist {
    type Item = CandidateRecord;
    type IntoIter = std::vec::IntoIter<CandidateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

/// Tracks chosen indices and their dedup keys.
struct Picked {
    order: Vec<usize>,
    indices: HashSet<usize>,
    keys: HashSet<DedupKey>,
}

impl Picked {
    fn with_capacity(n: usize) -> Self {
        Self {
            order: Vec::with_capacity(n),
            indices: HashSet::with_capacity(n),
            keys: HashSet::with_capacity(n),
        }
    }

    fn contains(&self, pool: &[CandidateRecord], i: usize) -> bool {
        if self.indices.contains(&i) {
            return true;
        }
        pool[i].dedup_key().is_some_and(|k| self.keys.contains(&k))
    }

    fn push(&mut self, pool: &[CandidateRecord], i: usize) {
        self.order.push(i);
        self.indices.insert(i);
        if let Some(key) = pool[i].dedup_key() {
            self.keys.insert(key);
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

fn fill_by<F>(
    pool: &[CandidateRecord],
    scores: &[ScoreVector],
    picked: &mut Picked,
    top_n: usize,
    key: F,
) where
    F: Fn(&ScoreVector) -> f64,
{
    let mut order: Vec<usize> = (0..pool.len()).collect();
    // Stable: ties keep pool order.
    order.sort_by(|&a, &b| key(&scores[b]).total_cmp(&key(&scores[a])));
    for i in order {
        if picked.len() >= top_n {
            break;
        }
        if !picked.contains(pool, i) {
            picked.push(pool, i);
        }
    }
}

/// Chooses shortlist indices into `pool`.
///
/// 1. Exact tier: every candidate with an identifier match, in pool order.
/// 2. Relation fill: remaining slots by `relation_overlap` descending.
/// 3. Tag fill: remaining slots by `tag_overlap` descending.
///
/// The exact tier may exceed `top_n` unless `cap_exact` is set. Duplicates
/// (by index or dedup key) are skipped.
///
/// # Errors
/// Returns `ValidationError::InvalidTopN` for `top_n == 0` and
/// `ValidationError::ScoreCountMismatch` when lengths differ.
pub fn select_indices(
    pool: &[CandidateRecord],
    scores: &[ScoreVector],
    top_n: usize,
    cap_exact: bool,
) -> Result<Vec<usize>, ValidationError> {
    if top_n == 0 {
        return Err(ValidationError::InvalidTopN { value: 0 });
    }
    if pool.len() != scores.len() {
        return Err(ValidationError::ScoreCountMismatch {
            candidates: pool.len(),
            scores: scores.len(),
        });
    }

    let mut picked = Picked::with_capacity(top_n);
    for (i, s) in scores.iter().enumerate() {
        if cap_exact && picked.len() >= top_n {
            break;
        }
        if s.identifier_match && !picked.contains(pool, i) {
            picked.push(pool, i);
        }
    }

    fill_by(pool, scores, &mut picked, top_n, |s| s.relation_overlap);
    fill_by(pool, scores, &mut picked, top_n, |s| s.tag_overlap);

    Ok(picked.order)
}

/// Builds a ranked shortlist from a scored pool.
///
/// # Errors
/// See [`select_indices`].
pub fn select(
    pool: &[CandidateRecord],
    scores: &[ScoreVector],
    top_n: usize,
    cap_exact: bool,
) -> Result<Shortlist, ValidationError> {
    let indices = select_indices(pool, scores, top_n, cap_exact)?;
    Ok(Shortlist {
        candidates: indices.into_iter().map(|i| pool[i].clone()).collect(),
        resolved_via: ResolutionPath::Ranked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::PlatformId;
    use crate::record::RecordSource;

    fn cand(name: &str) -> CandidateRecord {
        CandidateRecord::new(name, RecordSource::BulkDataset)
    }

    fn sv(id: bool, tag: f64, rel: f64) -> ScoreVector {
        ScoreVector {
            identifier_match: id,
            tag_overlap: tag,
            relation_overlap: rel,
        }
    }

    #[test]
    fn exact_tier_then_relation_then_tag() {
        let pool = vec![cand("A"), cand("B"), cand("C"), cand("D")];
        let scores = vec![
            sv(false, 0.9, 0.0),
            sv(false, 0.0, 0.5),
            sv(true, 0.0, 0.0),
            sv(false, 0.2, 0.1),
        ];
        let picked = select_indices(&pool, &scores, 3, false).unwrap();
        assert_eq!(picked, vec![2, 1, 3]);
    }

    #[test]
    fn ties_keep_pool_order() {
        let pool = vec![cand("A"), cand("B"), cand("C")];
        let scores = vec![sv(false, 0.5, 0.0); 3];
        assert_eq!(select_indices(&pool, &scores, 2, false).unwrap(), vec![0, 1]);
    }

    #[test]
    fn exact_tier_is_uncapped_by_default() {
        let pool = vec![cand("A"), cand("B"), cand("C")];
        let scores = vec![sv(true, 0.0, 0.0); 3];
        assert_eq!(select_indices(&pool, &scores, 1, false).unwrap().len(), 3);
        assert_eq!(select_indices(&pool, &scores, 1, true).unwrap(), vec![0]);
    }

    #[test]
    fn short_pool_returns_everything() {
        let pool = vec![cand("A"), cand("B")];
        let scores = vec![sv(false, 0.0, 0.0); 2];
        assert_eq!(select_indices(&pool, &scores, 5, false).unwrap(), vec![0, 1]);
    }

    #[test]
    fn empty_pool_is_empty() {
        assert!(select(&[], &[], 3, false).unwrap().is_empty());
    }

    #[test]
    fn duplicate_keys_are_skipped() {
        let id = PlatformId::new("ABC123456789").unwrap();
        let pool = vec![
            cand("A").with_platform_id(id.clone()),
            cand("A again").with_platform_id(id),
            cand("B"),
        ];
        let scores = vec![sv(false, 0.1, 0.0), sv(false, 0.9, 0.0), sv(false, 0.0, 0.0)];
        let list = select(&pool, &scores, 3, false).unwrap();
        assert_eq!(list.names(), vec!["A", "B"]);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let pool = vec![cand("A")];
        assert!(matches!(
            select(&pool, &[], 1, false),
            Err(ValidationError::ScoreCountMismatch { candidates: 1, scores: 0 })
        ));
    }

    #[test]
    fn zero_top_n_rejected() {
        assert!(matches!(
            select(&[], &[], 0, false),
            Err(ValidationError::InvalidTopN { value: 0 })
        ));
    }
}
