//! Query types and name decomposition.
//!
//! A query is a free-text name, a registry identifier (`~First_Last1`), a
//! structured registry profile, or a bare platform identifier.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identifier::PlatformId;

/// A link entry of a registry profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    /// Link label, e.g. `Google Scholar`.
    pub name: String,
    /// Target URL.
    pub url: String,
}

/// An expertise entry of a registry profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpertiseEntry {
    /// Free-form topic keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A relation (co-author, advisor, ...) of a registry profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Full name of the related person.
    pub name: String,
    /// Relation kind, e.g. `Coauthor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

/// Institution of a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Institution {
    /// Institution name.
    #[serde(default)]
    pub name: Option<String>,
    /// Institutional email domain.
    #[serde(default)]
    pub domain: Option<String>,
}

/// A career history entry of a registry profile. The first entry is current.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    /// Employer.
    #[serde(default)]
    pub institution: Option<Institution>,
}

/// A name entry of a registry profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NameEntry {
    /// Given name.
    #[serde(default)]
    pub first: Option<String>,
    /// Middle name or initials.
    #[serde(default)]
    pub middle: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last: Option<String>,
}

/// Profile content shared by structured queries and registry documents.
///
/// Every section is optional; a missing section yields empty evidence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileContent {
    /// Platform profile URL, when the profile links one directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gscholar: Option<String>,
    /// Labelled external links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<ProfileLink>,
    /// Expertise section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Vec<ExpertiseEntry>>,
    /// Relations section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<Relation>>,
    /// Career history, current entry first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
    /// Name variants, preferred first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<NameEntry>,
}

impl ProfileContent {
    /// Finds the platform profile URL: the direct field first, then the link labelled `label`.
    #[must_use]
    pub fn platform_url(&self, label: &str) -> Option<&str> {
        self.gscholar
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| {
                self.links
                    .iter()
                    .find(|l| l.name == label)
                    .map(|l| l.url.as_str())
            })
    }

    /// Current (first) history entry.
    #[must_use]
    pub fn current_history(&self) -> Option<&HistoryEntry> {
        self.history.as_ref().and_then(|h| h.first())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    content: ProfileContent,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileRepr {
    Wrapped { profile: ProfileBody },
    Bare(ProfileBody),
}

/// A structured registry profile used as a query.
///
/// Deserializes from either `{"id": ..., "content": {...}}` or the wrapped
/// `{"profile": {"id": ..., "content": {...}}}` form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ProfileRepr")]
pub struct StructuredProfile {
    /// Registry identifier (`~First_Last1`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Profile sections.
    pub content: ProfileContent,
}

impl From<ProfileRepr> for StructuredProfile {
    fn from(value: ProfileRepr) -> Self {
        let body = match value {
            ProfileRepr::Wrapped { profile } => profile,
            ProfileRepr::Bare(body) => body,
        };
        Self {
            id: body.id,
            content: body.content,
        }
    }
}

impl StructuredProfile {
    /// Creates a profile with an id and empty content.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            content: ProfileContent::default(),
        }
    }

    /// Recovers the subject's name: from the registry id, else from the first name entry.
    pub fn subject_name(&self) -> Result<NameParts, ValidationError> {
        if let Some(id) = self.id.as_deref().filter(|id| is_registry_id(id)) {
            return NameParts::from_registry_id(id);
        }
        let entry = self.content.names.first().ok_or_else(|| ValidationError::MissingField {
            field: "profile.id".to_string(),
        })?;
        let joined = [&entry.first, &entry.middle, &entry.last]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        NameParts::parse(&joined)
    }
}

/// A resolution query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Free-text name or registry id.
    Name(String),
    /// Structured registry profile.
    Profile(StructuredProfile),
    /// Bare platform identifier.
    Identifier(PlatformId),
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<StructuredProfile> for Query {
    fn from(value: StructuredProfile) -> Self {
        Self::Profile(value)
    }
}

impl From<PlatformId> for Query {
    fn from(value: PlatformId) -> Self {
        Self::Identifier(value)
    }
}

impl TryFrom<serde_json::Value> for Query {
    type Error = ValidationError;

    /// Accepts a JSON string (name) or object (structured profile, or
    /// `{"platform_id": ...}`); anything else is an invalid argument.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::String(name) => Ok(Self::Name(name)),
            Value::Object(map) => {
                if let Some(id) = map.get("platform_id") {
                    let Some(id) = id.as_str() else {
                        return Err(ValidationError::InvalidQueryType {
                            found: "non-string platform_id".to_string(),
                        });
                    };
                    return Ok(Self::Identifier(PlatformId::new(id)?));
                }
                serde_json::from_value(Value::Object(map))
                    .map(Self::Profile)
                    .map_err(|e| ValidationError::InvalidQueryType {
                        found: format!("malformed profile object ({e})"),
                    })
            }
            Value::Null => Err(invalid_type("null")),
            Value::Bool(_) => Err(invalid_type("boolean")),
            Value::Number(_) => Err(invalid_type("number")),
            Value::Array(_) => Err(invalid_type("array")),
        }
    }
}

fn invalid_type(found: &str) -> ValidationError {
    ValidationError::InvalidQueryType {
        found: found.to_string(),
    }
}

/// Returns true for registry identifiers (`~` prefix, no spaces).
#[must_use]
pub fn is_registry_id(value: &str) -> bool {
    value.starts_with('~') && !value.contains(' ')
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// A decomposed person name (at least one part).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    parts: Vec<String>,
}

impl NameParts {
    /// Splits a free-text name on whitespace.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let parts: Vec<String> = name.split_whitespace().map(str::to_string).collect();
        if parts.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self { parts })
    }

    /// Recovers a name from a registry id: `~Rachel_K._E._Bellamy1` becomes
    /// `Rachel K. E. Bellamy`.
    pub fn from_registry_id(id: &str) -> Result<Self, ValidationError> {
        let body = id.trim().trim_start_matches('~');
        let mut parts: Vec<String> = body
            .split('_')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(last) = parts.last_mut() {
            last.retain(|c| !c.is_ascii_digit());
        }
        parts.retain(|p| !p.is_empty());
        if parts.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self { parts })
    }

    /// All name parts in order.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// First name part.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.parts[0]
    }

    /// Last name part (same as first for single-part names).
    #[must_use]
    pub fn last(&self) -> &str {
        &self.parts[self.parts.len() - 1]
    }

    /// `First Last`, the form used for dataset and listing lookups.
    #[must_use]
    pub fn display(&self) -> String {
        if self.parts.len() == 1 {
            self.first().to_string()
        } else {
            format!("{} {}", self.first(), self.last())
        }
    }

    /// Registry ids to probe: `~First_Last`, plus `~First_M._Last` for names
    /// with middle parts. Single-part names produce no ids.
    #[must_use]
    pub fn registry_ids(&self) -> Vec<String> {
        if self.parts.len() < 2 {
            return Vec::new();
        }
        let last_idx = self.parts.len() - 1;
        let formatted: Vec<String> = self
            .parts
            .iter()
            .enumerate()
            .map(|(idx, part)| {
                if idx == 0 || idx == last_idx {
                    capitalize(part)
                } else if part.chars().count() > 1 {
                    let initial: String = part.chars().take(1).flat_map(char::to_uppercase).collect();
                    format!("{initial}.")
                } else {
                    part.to_uppercase()
                }
            })
            .collect();

        let mut ids = vec![format!("~{}_{}", formatted[0], formatted[last_idx])];
        if formatted.len() > 2 {
            ids.push(format!("~{}", formatted.join("_")));
        }
        ids
    }
}
