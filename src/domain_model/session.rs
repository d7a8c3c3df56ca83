use crate::domain_model::{AccessToken, RefreshToken, SubjectId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// 128 bits of entropy; session ids must not be guessable.
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(SessionId)
    }
}

/// Fixed auth-method fields plus one opaque extension map for
/// provider-specific profile data. Nothing in here is trusted for
/// authorization decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub auth_method: String,
    pub provider: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SessionMetadata {
    pub fn password() -> Self {
        SessionMetadata {
            auth_method: "password".to_string(),
            provider: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn oauth(provider: &str, profile: BTreeMap<String, serde_json::Value>) -> Self {
        SessionMetadata {
            auth_method: "oauth".to_string(),
            provider: Some(provider.to_string()),
            extra: profile,
        }
    }
}

/// One authenticated principal's continuity across requests.
///
/// `current_access_token`/`current_refresh_token` always hold the most
/// recently issued pair; every earlier pair for this session is already in
/// the revocation set (or expired) by the time the fields are overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub subject_id: SubjectId,
    pub tenant_id: TenantId,
    pub current_access_token: AccessToken,
    pub current_refresh_token: RefreshToken,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub metadata: SessionMetadata,
}

impl Session {
    /// Fixed-TTL expiry: `expires_at` is written once at creation and never
    /// extended by reads or rotations.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
