use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct FakeSessionAuthority;

impl FakeSessionAuthority {
    pub fn new() -> Self {
        Self
    }
}

// Minimal fake implementation for basic use only.
// Extend to simulate more error cases and configurable responses when needed.
#[async_trait::async_trait]
impl SessionAuthority for FakeSessionAuthority {
    async fn login(&self, input: LoginInput) -> Result<SessionGrant, AuthError> {
        Ok(fake_grant(&input.subject_id, &input.tenant_id))
    }

    async fn complete_oauth(&self, info: OAuthUserInfo) -> Result<SessionGrant, AuthError> {
        let subject_id = SubjectId::from_oauth(&info.provider, &info.external_id);
        Ok(fake_grant(&subject_id, &info.tenant_id))
    }

    async fn validate(&self, token: &AccessToken) -> Result<TokenClaims, AuthError> {
        let Some(rest) = token.0.strip_prefix("fake-access-token:") else {
            return Err(AuthError::TokenMalformed);
        };
        let Some((tenant, subject)) = rest.split_once(':') else {
            return Err(AuthError::TokenMalformed);
        };
        let now = Utc::now();
        Ok(TokenClaims {
            subject_id: SubjectId::new(subject),
            tenant_id: Some(TenantId::new(tenant)),
            kind: TokenKind::Access,
            issued_at: now,
            expires_at: now + Duration::days(1),
            token_id: None,
            extra: BTreeMap::new(),
        })
    }

    async fn rotate(
        &self,
        refresh_token: &RefreshToken,
        _session_id: SessionId,
    ) -> Result<TokenPair, AuthError> {
        let Some(rest) = refresh_token.0.strip_prefix("fake-refresh-token:") else {
            return Err(AuthError::TokenMalformed);
        };
        let now = Utc::now();
        Ok(TokenPair {
            access_token: AccessToken(format!("fake-access-token:{}", rest)),
            refresh_token: RefreshToken(format!("fake-refresh-token:{}", rest)),
            access_token_expires_at: now + Duration::days(1),
            refresh_token_expires_at: now + Duration::days(7),
        })
    }

    async fn logout(&self, _session_id: SessionId) -> Result<bool, AuthError> {
        Ok(true)
    }

    async fn sweep(&self) -> Result<u64, AuthError> {
        Ok(0)
    }
}

fn fake_grant(subject_id: &SubjectId, tenant_id: &TenantId) -> SessionGrant {
    let payload = format!("{}:{}", tenant_id, subject_id);
    SessionGrant {
        session_id: SessionId(uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_OID,
            subject_id.as_str().as_bytes(),
        )),
        access_token: AccessToken(format!("fake-access-token:{}", payload)),
        refresh_token: RefreshToken(format!("fake-refresh-token:{}", payload)),
        expires_in: 900,
    }
}
