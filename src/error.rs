//! Error types for scholar-resolve.
//!
//! All errors are strongly typed using thiserror. Collaborator failures
//! ([`SourceError`]) are normally recovered inside the resolver and only
//! logged; validation failures ([`ValidationError`]) are reported to the
//! caller.

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The query name is blank.
    #[error("Query name cannot be empty")]
    EmptyName,

    /// The query is neither a name string nor a structured profile.
    #[error("Query must be a name string or a structured profile, not {found}")]
    InvalidQueryType {
        /// JSON type that was supplied.
        found: String,
    },

    /// A required field is absent.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Dotted path of the field.
        field: String,
    },

    /// `top_n` is zero.
    #[error("top_n must be at least 1 (got {value})")]
    InvalidTopN {
        /// Rejected value.
        value: usize,
    },

    /// A platform identifier has the wrong length.
    #[error("Platform identifier '{value}' must be exactly {expected} characters")]
    InvalidPlatformId {
        /// Rejected identifier.
        value: String,
        /// Required length.
        expected: usize,
    },

    /// `score` was called without evidence.
    #[error("Scoring requires at least one evidence profile")]
    NoEvidenceProfiles,

    /// Scores and candidates do not line up.
    #[error("Score map has {scores} entries for {candidates} candidates")]
    ScoreCountMismatch {
        /// Pool size.
        candidates: usize,
        /// Number of score vectors.
        scores: usize,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },
}

/// Errors raised by external collaborators (dataset, registry, live fetcher)
/// and by local profile loading.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The collaborator could not be reached or refused the request.
    #[error("Source '{source_name}' is unavailable: {message}")]
    Unavailable {
        /// Collaborator name.
        source_name: String,
        /// Failure detail.
        message: String,
    },

    /// Failure inside a source implementation.
    #[error("Source backend error: {0}")]
    Backend(String),

    /// File access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    /// Creates an `Unavailable` error.
    #[must_use]
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Top-level error type for resolution runs.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Invalid argument or configuration.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local profile data could not be loaded.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl ResolveError {
    /// Returns true if this is a validation (invalid argument) error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a source error.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
