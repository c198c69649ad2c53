//! Resolver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identifier::PlatformId;

const ID_PLACEHOLDER: &str = "{id}";

/// Tunables for a [`Resolver`](crate::Resolver).
///
/// Missing fields fall back to [`Default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Shortlist size used when a request does not set one.
    pub top_n: usize,
    /// Strip paper lists from returned records unless a request asks otherwise.
    pub simple: bool,
    /// Pause after every registry probe.
    pub registry_delay_ms: u64,
    /// Pause after every live page or listing fetch.
    pub page_delay_ms: u64,
    /// Missed numbered-variant probes tolerated per registry id before giving up.
    pub max_variant_misses: u32,
    /// Hard cap on numbered-variant probes per registry id.
    pub max_variant_probes: u32,
    /// Replace author listings with their full profile pages.
    pub expand_listings: bool,
    /// Label of the registry link that points at the platform profile.
    pub profile_link_label: String,
    /// Platform profile URL; `{id}` is replaced by the identifier.
    pub profile_url_template: String,
    /// Truncate the exact-identifier tier to `top_n`.
    pub cap_exact_matches: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            simple: true,
            registry_delay_ms: 1_000,
            page_delay_ms: 5_000,
            max_variant_misses: 1,
            max_variant_probes: 16,
            expand_listings: false,
            profile_link_label: "Google Scholar".to_string(),
            profile_url_template: "https://scholar.google.com/citations?hl=en&user={id}".to_string(),
            cap_exact_matches: false,
        }
    }
}

impl ResolverConfig {
    /// Default configuration with all fetch delays disabled.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            registry_delay_ms: 0,
            page_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.top_n == 0 {
            return Err(ValidationError::InvalidTopN { value: 0 });
        }
        if self.max_variant_probes == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "max_variant_probes must be at least 1".to_string(),
            });
        }
        if !self.profile_url_template.contains(ID_PLACEHOLDER) {
            return Err(ValidationError::InvalidConfig {
                reason: format!("profile_url_template must contain {ID_PLACEHOLDER}"),
            });
        }
        Ok(())
    }

    /// Pause after a registry probe.
    #[must_use]
    pub const fn registry_delay(&self) -> Duration {
        Duration::from_millis(self.registry_delay_ms)
    }

    /// Pause after a live fetch.
    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Platform profile URL for an identifier.
    #[must_use]
    pub fn profile_url(&self, id: &PlatformId) -> String {
        self.profile_url_template.replace(ID_PLACEHOLDER, id.as_str())
    }
}
