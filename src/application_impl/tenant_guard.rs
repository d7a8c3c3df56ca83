use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::{AccessToken, TenantId};
use std::sync::Arc;
use tracing::warn;

/// Tenant scope for downstream data-layer filtering, derived per request
/// from a validated access token and never stored.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: TenantId,
}

/// The per-request tenant isolation boundary. Fail-closed: a token with no
/// tenant claim is not a valid credential for any tenant-scoped operation,
/// and any tenant mismatch is a hard failure. There is no bypass mode.
pub struct TenantGuard {
    token_codec: Arc<dyn TokenCodec>,
}

impl TenantGuard {
    pub fn new(token_codec: Arc<dyn TokenCodec>) -> Self {
        Self { token_codec }
    }

    pub async fn extract_tenant(&self, token: &AccessToken) -> Result<TenantId, AuthError> {
        let claims = self.token_codec.verify_access_token(token).await?;
        claims.tenant_id.ok_or(AuthError::MissingTenantClaim)
    }

    pub async fn authorize(
        &self,
        token: &AccessToken,
        resource_tenant_id: &TenantId,
    ) -> Result<(), AuthError> {
        let claims = self.token_codec.verify_access_token(token).await?;
        let token_tenant = claims.tenant_id.ok_or(AuthError::MissingTenantClaim)?;
        if token_tenant != *resource_tenant_id {
            // Security signal: repeated denials are either a bug or an
            // attack. Ids only, never the token itself.
            warn!(
                subject_id = %claims.subject_id,
                token_tenant = %token_tenant,
                resource_tenant = %resource_tenant_id,
                "cross-tenant access denied"
            );
            return Err(AuthError::CrossTenantAccess);
        }
        Ok(())
    }

    pub async fn session_context(&self, token: &AccessToken) -> Result<TenantContext, AuthError> {
        let tenant_id = self.extract_tenant(token).await?;
        Ok(TenantContext { tenant_id })
    }
}
