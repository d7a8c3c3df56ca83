use crate::application_port::TokenClaims;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Failure taxonomy for every credential and session operation. All of these
/// are terminal for the current request; callers match on the kind, never on
/// message text.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Structurally invalid or not signed with the expected key. Not
    /// retryable; the caller must re-authenticate.
    #[error("token malformed")]
    TokenMalformed,
    /// Past `expires_at`. The caller should rotate if it still holds a live
    /// refresh token, otherwise re-authenticate.
    #[error("token expired")]
    TokenExpired,
    /// An access token presented where a refresh token was expected, or the
    /// reverse. Client programming error, not retryable.
    #[error("wrong token kind")]
    WrongTokenKind,
    /// Explicitly invalidated by rotation or logout. Never retryable with
    /// the same token.
    #[error("token revoked")]
    TokenRevoked,
    /// The token carries no tenant claim; it is not a valid credential for
    /// any tenant-scoped operation.
    #[error("missing tenant claim")]
    MissingTenantClaim,
    /// The token's tenant does not own the requested resource.
    #[error("cross-tenant access denied")]
    CrossTenantAccess,
    /// Session missing, expired, or already deleted.
    #[error("session not found")]
    SessionNotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub subject_id: SubjectId,
    pub tenant_id: TenantId,
    pub metadata: SessionMetadata,
}

/// Provider-shaped user info handed over after the (external) OAuth token
/// exchange has completed.
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    pub provider: String,
    pub external_id: String,
    pub tenant_id: TenantId,
    pub profile: BTreeMap<String, serde_json::Value>,
}

/// What a successful login or OAuth completion hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub session_id: SessionId,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    /// Seconds until the access token expires.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Orchestrates codec, session store, and revocation store. The only
/// component allowed to touch all three, and the only place where the
/// revoke-before-store-update rotation invariant is enforced.
#[async_trait::async_trait]
pub trait SessionAuthority: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<SessionGrant, AuthError>;
    /// Maps provider user info onto a stable subject id, then behaves like
    /// `login` with metadata capturing the provider handoff.
    async fn complete_oauth(&self, info: OAuthUserInfo) -> Result<SessionGrant, AuthError>;
    /// Revocation check first, then signature/expiry/kind verification.
    async fn validate(&self, token: &AccessToken) -> Result<TokenClaims, AuthError>;
    /// Issues a fresh pair, revokes the old one, and updates the session —
    /// in that order, so a crash between the steps leaves the old pair
    /// revoked rather than silently valid.
    async fn rotate(
        &self,
        refresh_token: &RefreshToken,
        session_id: SessionId,
    ) -> Result<TokenPair, AuthError>;
    /// Revokes the session's current pair and deletes the session.
    /// Idempotent: a second call for the same session returns `false`.
    async fn logout(&self, session_id: SessionId) -> Result<bool, AuthError>;
    /// Purges expired sessions and revocation entries; returns the combined
    /// count. Meant to run on a timer, not per-request.
    async fn sweep(&self) -> Result<u64, AuthError>;
}
