//! Evidence layer.
//!
//! This module groups evidence profiles and the aggregator that builds them.

mod aggregator;
mod profile;

pub use aggregator::{EvidenceAggregator, EvidenceOutcome, ExactSource};
pub use profile::EvidenceProfile;
