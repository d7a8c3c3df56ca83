use crate::application_port::{AuthError, TokenPair};
use crate::domain_model::{AccessToken, RefreshToken, SubjectId, TenantId, TokenKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Verified claims of a decoded token.
///
/// `tenant_id` is optional at this level: a token without a tenant claim
/// decodes fine but is rejected by the tenant guard before it can be used
/// for anything tenant-scoped.
#[derive(Debug, Clone, Serialize)]
pub struct TokenClaims {
    pub subject_id: SubjectId,
    pub tenant_id: Option<TenantId>,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Unique per refresh token, used for targeted revocation tracking.
    pub token_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Stateless signer/verifier. Owns no shared state; thread-safe by
/// construction.
#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        subject_id: &SubjectId,
        tenant_id: &TenantId,
        extra: Option<&BTreeMap<String, serde_json::Value>>,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;

    async fn issue_refresh_token(
        &self,
        subject_id: &SubjectId,
        tenant_id: &TenantId,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError>;

    async fn issue_pair(
        &self,
        subject_id: &SubjectId,
        tenant_id: &TenantId,
        extra: Option<&BTreeMap<String, serde_json::Value>>,
    ) -> Result<TokenPair, AuthError> {
        let (access_token, access_exp) =
            self.issue_access_token(subject_id, tenant_id, extra).await?;
        let (refresh_token, refresh_exp) =
            self.issue_refresh_token(subject_id, tenant_id).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    async fn verify_access_token(&self, token: &AccessToken) -> Result<TokenClaims, AuthError>;

    async fn verify_refresh_token(&self, token: &RefreshToken) -> Result<TokenClaims, AuthError>;
}
