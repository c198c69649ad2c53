//! Platform identifiers.
//!
//! A researcher profile on the indexing platform is named by a short,
//! fixed-length token carried in the `user=` query parameter of its URL.
//! It is the only key shared between otherwise unrelated sources, so it is
//! the highest-weight matching signal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of characters in a platform identifier.
pub const PLATFORM_ID_LEN: usize = 12;

const USER_MARKER: &str = "user=";

/// Canonical researcher identifier on the indexing platform.
///
/// Always exactly [`PLATFORM_ID_LEN`] characters.
///
/// # Examples
///
/// ```
/// use scholar_resolve::PlatformId;
///
/// let id = PlatformId::new("ABC123456789").unwrap();
/// assert_eq!(id.as_str(), "ABC123456789");
/// assert!(PlatformId::new("short").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformId(String);

impl PlatformId {
    /// Validates and wraps an identifier token.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.chars().count() != PLATFORM_ID_LEN {
            return Err(ValidationError::InvalidPlatformId {
                value,
                expected: PLATFORM_ID_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extracts the identifier from a profile URL.
    ///
    /// Returns `None` when the URL has no `user=` marker or fewer than
    /// [`PLATFORM_ID_LEN`] characters follow it.
    ///
    /// ```
    /// use scholar_resolve::PlatformId;
    ///
    /// let id = PlatformId::from_url("https://x/profile?user=ABCDEFGHIJKLMNOP").unwrap();
    /// assert_eq!(id.as_str(), "ABCDEFGHIJKL");
    /// assert!(PlatformId::from_url("https://x/profile").is_none());
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let (_, rest) = url.split_once(USER_MARKER)?;
        let token: String = rest.chars().take(PLATFORM_ID_LEN).collect();
        if token.chars().count() < PLATFORM_ID_LEN {
            return None;
        }
        Some(Self(token))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlatformId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlatformId> for String {
    fn from(value: PlatformId) -> Self {
        value.0
    }
}

/// Extracts a platform identifier from a URL, if one is present.
///
/// Free-function form of [`PlatformId::from_url`].
#[must_use]
pub fn extract_platform_id(url: &str) -> Option<PlatformId> {
    PlatformId::from_url(url)
}
