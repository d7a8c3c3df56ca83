use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable principal identifier. For OAuth-originated principals this is
/// `"{provider}:{external_id}"` so the same external account always maps to
/// the same subject.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        SubjectId(id.into())
    }

    pub fn from_oauth(provider: &str, external_id: &str) -> Self {
        SubjectId(format!("{}:{}", provider, external_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SubjectId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SubjectId(s.to_string()))
    }
}
