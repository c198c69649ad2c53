//! Scoring and selection.
//!
//! Candidates are scored against evidence profiles ([`score`]) and the
//! scores are turned into an ordered [`Shortlist`] ([`select`]). The
//! [`similarity`] helpers rank same-named alternatives such as handles.

mod scorer;
mod selector;
mod similarity;

pub use scorer::{score, score_candidate, ScoreVector};
pub use selector::{select, select_indices, ResolutionPath, Shortlist};
pub use similarity::{handle_score, normalize_handle, rank_handles, similarity, RankedHandle};
