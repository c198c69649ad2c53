//! Name similarity for ranking same-named alternatives such as platform handles.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static HANDLE_NOISE_RE: OnceLock<Regex> = OnceLock::new();

const HANDLE_NOISE_PATTERN: &str = r"[0-9_.,\s]";

fn handle_noise_re() -> &'static Regex {
    HANDLE_NOISE_RE
        .get_or_init(|| Regex::new(HANDLE_NOISE_PATTERN).expect("valid handle noise pattern"))
}

/// Character-sequence similarity in `[0, 1]`: one minus the Levenshtein
/// distance over the longer length. Two empty strings are identical.
///
/// ```
/// use scholar_resolve::scoring::similarity;
///
/// assert!((similarity("abxd", "abyd") - 0.75).abs() < 1e-9);
/// assert_eq!(similarity("", ""), 1.0);
/// ```
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Strips digits, `_`, `.`, `,` and whitespace, then lower-cases.
#[must_use]
pub fn normalize_handle(value: &str) -> String {
    handle_noise_re().replace_all(value, "").to_lowercase()
}

/// Scores one handle against a primary and an optional secondary name.
///
/// Returns the best normalized similarity of the supplied names, or `0.0`
/// when neither is supplied.
#[must_use]
pub fn handle_score(handle: &str, primary: Option<&str>, secondary: Option<&str>) -> f64 {
    let handle = normalize_handle(handle);
    [primary, secondary]
        .into_iter()
        .flatten()
        .map(|name| similarity(&handle, &normalize_handle(name)))
        .fold(0.0, f64::max)
}

/// A platform handle with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHandle {
    /// Handle as supplied.
    pub handle: String,
    /// Best similarity in `[0, 1]`.
    pub score: f64,
}

/// Ranks handles by [`handle_score`], best first. Ties keep input order.
#[must_use]
pub fn rank_handles<I, S>(handles: I, primary: Option<&str>, secondary: Option<&str>) -> Vec<RankedHandle>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ranked: Vec<RankedHandle> = handles
        .into_iter()
        .map(|h| {
            let handle = h.into();
            let score = handle_score(&handle, primary, secondary);
            RankedHandle { handle, score }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
