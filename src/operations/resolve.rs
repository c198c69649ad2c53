//! RESOLVE request builder.
//!
//! The `ResolveRequestBuilder` provides a fluent API for constructing
//! resolution requests. It validates inputs; unset options fall back to the
//! resolver's configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::query::Query;

/// A validated resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    query: Query,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_n: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    simple: Option<bool>,
}

impl ResolveRequest {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> ResolveRequestBuilder {
        ResolveRequestBuilder::new()
    }

    /// A request with configuration defaults.
    #[must_use]
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
            top_n: None,
            simple: None,
        }
    }

    /// The query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Requested shortlist size, if set.
    #[must_use]
    pub const fn top_n(&self) -> Option<usize> {
        self.top_n
    }

    /// Requested simple mode, if set.
    #[must_use]
    pub const fn simple(&self) -> Option<bool> {
        self.simple
    }

    /// Re-checks a deserialized request.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidTopN` for `top_n == 0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.top_n {
            Some(0) => Err(ValidationError::InvalidTopN { value: 0 }),
            _ => Ok(()),
        }
    }
}

/// Builder for [`ResolveRequest`].
///
/// # Example
/// ```
/// use scholar_resolve::operations::ResolveRequestBuilder;
///
/// let request = ResolveRequestBuilder::new()
///     .name("Jane Doe")
///     .top_n(5)
///     .full()
///     .build()
///     .unwrap();
/// assert_eq!(request.top_n(), Some(5));
/// assert_eq!(request.simple(), Some(false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolveRequestBuilder {
    query: Option<Query>,
    top_n: Option<usize>,
    simple: Option<bool>,
}

impl ResolveRequestBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query.
    #[must_use]
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets a free-text name (or registry id) query.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.query = Some(Query::Name(name.into()));
        self
    }

    /// Parses a JSON query: a string or a profile object.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidQueryType` for any other JSON value.
    pub fn json_query(mut self, value: serde_json::Value) -> Result<Self, ValidationError> {
        self.query = Some(Query::try_from(value)?);
        Ok(self)
    }

    /// Sets the shortlist size (must be at least 1).
    #[must_use]
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Strips paper lists from returned records.
    #[must_use]
    pub fn simple(mut self) -> Self {
        self.simple = Some(true);
        self
    }

    /// Keeps paper lists on returned records.
    #[must_use]
    pub fn full(mut self) -> Self {
        self.simple = Some(false);
        self
    }

    /// Builds the request.
    ///
    /// Returns `ValidationError` if:
    /// - No query is specified
    /// - `top_n` is zero
    /// - A name query is blank
    pub fn build(self) -> Result<ResolveRequest, ValidationError> {
        let query = self.query.ok_or_else(|| ValidationError::MissingField {
            field: "query".to_string(),
        })?;

        if let Query::Name(name) = &query {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
        }

        let request = ResolveRequest {
            query,
            top_n: self.top_n,
            simple: self.simple,
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::identifier::PlatformId;

    #[test]
    fn test_name_only() {
        let request = ResolveRequestBuilder::new().name("Jane Doe").build().unwrap();
        assert_eq!(request.query(), &Query::Name("Jane Doe".to_string()));
        assert_eq!(request.top_n(), None);
        assert_eq!(request.simple(), None);
    }

    #[test]
    fn test_no_query_fails() {
        assert!(matches!(
            ResolveRequestBuilder::new().build(),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn test_blank_name_fails() {
        assert!(matches!(
            ResolveRequestBuilder::new().name("   ").build(),
            Err(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn test_zero_top_n_fails() {
        assert!(matches!(
            ResolveRequestBuilder::new().name("Jane Doe").top_n(0).build(),
            Err(ValidationError::InvalidTopN { value: 0 })
        ));
    }

    #[test]
    fn test_identifier_query() {
        let id = PlatformId::new("ABC123456789").unwrap();
        let request = ResolveRequestBuilder::new().query(id.clone()).simple().build().unwrap();
        assert_eq!(request.query(), &Query::Identifier(id));
        assert_eq!(request.simple(), Some(true));
    }

    #[test]
    fn test_json_query_rejects_numbers() {
        assert!(matches!(
            ResolveRequestBuilder::new().json_query(json!(42)),
            Err(ValidationError::InvalidQueryType { .. })
        ));
    }

    #[test]
    fn test_json_query_profile() {
        let request = ResolveRequestBuilder::new()
            .json_query(json!({"profile": {"id": "~Jane_Doe1", "content": {}}}))
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(request.query(), Query::Profile(_)));
    }

    #[test]
    fn test_deserialized_request_is_revalidated() {
        let request: ResolveRequest =
            serde_json::from_value(json!({"query": {"name": "Jane Doe"}, "top_n": 0})).unwrap();
        assert!(request.validate().is_err());
    }
}
