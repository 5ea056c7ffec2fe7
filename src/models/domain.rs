use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Origin of a temp-domain registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DomainSource {
    /// Seeded at startup; immutable.
    Builtin,
    /// Added through the registry API.
    User,
}

/// A known disposable-email domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TempDomain {
    pub id: String,
    /// Lowercase domain, unique across the registry
    pub domain: String,
    pub source: DomainSource,
    pub created_at: DateTime<Utc>,
}

impl TempDomain {
    /// Creates a new entry with a fresh id. `domain` must already be normalized.
    pub fn new(domain: impl Into<String>, source: DomainSource) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain: domain.into(),
            source,
            created_at: Utc::now(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.source == DomainSource::Builtin
    }
}
