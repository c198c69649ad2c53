//! Local profile directory.
//!
//! A map of structured registry profiles keyed by registry id, typically
//! loaded from exported JSON files. A string query naming one of these ids is
//! resolved from the stored profile instead of the remote registry.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::SourceError;
use crate::query::StructuredProfile;

/// Structured profiles keyed by registry id.
#[derive(Debug, Clone, Default)]
pub struct ProfileDirectory {
    profiles: HashMap<String, StructuredProfile>,
}

impl ProfileDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object mapping registry ids to profiles.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let profiles: HashMap<String, StructuredProfile> = serde_json::from_str(json)?;
        Ok(Self { profiles })
    }

    /// Loads and merges several JSON files. Later files override earlier ones.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SourceError> {
        let mut directory = Self::new();
        for path in paths {
            let text = fs::read_to_string(path.as_ref())?;
            let part = Self::from_json_str(&text)?;
            info!(path = %path.as_ref().display(), profiles = part.len(), "loaded profile directory");
            directory.extend(part);
        }
        Ok(directory)
    }

    /// Adds or replaces a profile.
    pub fn insert(&mut self, id: impl Into<String>, profile: StructuredProfile) {
        self.profiles.insert(id.into(), profile);
    }

    /// Merges another directory into this one; its entries win.
    pub fn extend(&mut self, other: Self) {
        self.profiles.extend(other.profiles);
    }

    /// Looks up a profile by registry id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StructuredProfile> {
        self.profiles.get(id)
    }

    /// Number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
