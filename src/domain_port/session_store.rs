use crate::application_port::AuthError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Everything a new session needs except what the store generates itself
/// (id and timestamps).
#[derive(Debug, Clone)]
pub struct NewSession {
    pub subject_id: SubjectId,
    pub tenant_id: TenantId,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub metadata: SessionMetadata,
}

/// Shared mapping from session id to session record, with fixed-TTL expiry.
///
/// The store only stores: revoking the pair a session held before an
/// `update_tokens` call is the authority's job, and must already have
/// happened by the time the call is made.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Generates an unguessable session id, stamps `created_at` /
    /// `last_activity_at` / `expires_at`, and persists the record.
    async fn create(&self, new: NewSession) -> Result<Session, AuthError>;

    /// `Ok(None)` covers both missing and expired records; an expired
    /// session is indistinguishable from a deleted one to callers. A
    /// successful read touches `last_activity_at` without extending
    /// `expires_at`.
    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, AuthError>;

    /// Replaces the current pair as one unit; the stored record never mixes
    /// fields from two different rotations. Returns `false` for a missing
    /// or expired session.
    async fn update_tokens(
        &self,
        session_id: SessionId,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Result<bool, AuthError>;

    async fn delete(&self, session_id: SessionId) -> Result<bool, AuthError>;

    /// Removes records whose `expires_at` has passed; returns how many.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;

    /// Linear scan is acceptable at this scale.
    async fn list_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Session>, AuthError>;
}
